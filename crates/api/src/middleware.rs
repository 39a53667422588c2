//! Request pipeline stages.
//!
//! Stages run on the fully built request, right before it is handed to the
//! transport, in the order they were registered.

use std::sync::Arc;

use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use liftlog_auth::CredentialStore;

pub trait RequestStage: Send + Sync {
    fn apply(&self, request: &mut Request);
}

/// Attaches `Authorization: Bearer <token>` when the store holds a token.
///
/// The store is read on every request; nothing is cached here.
#[derive(Clone)]
pub struct BearerAuth {
    store: Arc<dyn CredentialStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl RequestStage for BearerAuth {
    fn apply(&self, request: &mut Request) {
        let Some(token) = self.store.get() else {
            request.headers_mut().remove(AUTHORIZATION);
            return;
        };

        match HeaderValue::from_str(&token.header_value()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!("stored token is not a valid header value; sending unauthenticated");
                request.headers_mut().remove(AUTHORIZATION);
            }
        }
    }
}
