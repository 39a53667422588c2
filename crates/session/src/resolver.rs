//! Stored token -> confirmed identity.

use std::sync::Arc;

use liftlog_auth::{CredentialStore, peek_claims};
use liftlog_core::Identity;

use crate::{AccountGateway, SessionError};

/// Resolves the current session against the server.
///
/// Failures split two ways:
/// - the session is dead (token undecodable, or the server answers 401/403/404
///   for the subject): the store is cleared and the result is `Ok(None)`;
/// - the server could not be asked (no response, 5xx, unreadable body): the
///   token is kept and the failure is returned as [`SessionError::Transport`].
#[derive(Clone)]
pub struct SessionResolver {
    store: Arc<dyn CredentialStore>,
    gateway: Arc<dyn AccountGateway>,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn CredentialStore>, gateway: Arc<dyn AccountGateway>) -> Self {
        Self { store, gateway }
    }

    pub async fn resolve_current_identity(&self) -> Result<Option<Identity>, SessionError> {
        let Some(token) = self.store.get() else {
            tracing::debug!("no stored token; skipping identity lookup");
            return Ok(None);
        };

        let claims = match peek_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(error = %e, "stored token is unreadable; discarding session");
                self.store.clear();
                return Ok(None);
            }
        };

        match self.gateway.fetch_user(&claims.subject).await {
            Ok(identity) => {
                tracing::info!(user_id = %identity.id, "session resolved");
                Ok(Some(identity))
            }
            Err(e) if e.invalidates_session() => {
                tracing::warn!(
                    user_id = %claims.subject,
                    error = %e,
                    "server rejected stored session; discarding"
                );
                self.store.clear();
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity lookup failed; keeping stored token");
                Err(SessionError::Transport(e))
            }
        }
    }
}
