//! In-process stand-ins for the remote service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{TimeZone, Utc};

use liftlog_api::{ApiError, LoginResponse, UserUpdate};
use liftlog_auth::BearerToken;
use liftlog_core::{Identity, Role, UserId};

/// Unsigned JWT-shaped token whose payload names `user_id`.
pub fn token_for(user_id: &str) -> BearerToken {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"{user_id}"}}"#));
    BearerToken::new(format!("{header}.{payload}.sig"))
}

pub fn identity(id: &str, name: &str, email: &str) -> Identity {
    Identity {
        id: UserId::new(id).unwrap(),
        name: name.to_string(),
        email: email.to_string(),
        role: Role::User,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
    }
}

struct Account {
    identity: Identity,
    password: String,
}

/// Accounts keyed by user id; passwords default to `"secret"`.
#[derive(Default)]
pub struct FakeGateway {
    accounts: Mutex<HashMap<String, Account>>,
    fetch_error: Option<ApiError>,
    login_error: Option<ApiError>,
    update_error: Option<ApiError>,
    blank_tokens: bool,
    fetch_calls: AtomicUsize,
    login_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, id: &str, email: &str) -> Self {
        self.with_account(id, email, "secret")
    }

    pub fn with_account(self, id: &str, email: &str, password: &str) -> Self {
        self.accounts.lock().unwrap().insert(
            id.to_string(),
            Account {
                identity: identity(id, "Test User", email),
                password: password.to_string(),
            },
        );
        self
    }

    pub fn failing_fetch(mut self, err: ApiError) -> Self {
        self.fetch_error = Some(err);
        self
    }

    pub fn failing_login(mut self, err: ApiError) -> Self {
        self.login_error = Some(err);
        self
    }

    pub fn failing_update(mut self, err: ApiError) -> Self {
        self.update_error = Some(err);
        self
    }

    /// Successful logins hand back an empty token.
    pub fn issuing_blank_tokens(mut self) -> Self {
        self.blank_tokens = true;
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl crate::AccountGateway for FakeGateway {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.login_error {
            return Err(err.clone());
        }

        let accounts = self.accounts.lock().unwrap();
        accounts
            .values()
            .find(|a| a.identity.email == email && a.password == password)
            .map(|a| LoginResponse {
                token: if self.blank_tokens {
                    BearerToken::new("")
                } else {
                    token_for(a.identity.id.as_str())
                },
                user: a.identity.clone(),
            })
            .ok_or_else(|| ApiError::from_status(401, r#"{"error":"Invalid credentials"}"#))
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, ApiError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|a| a.identity.email == email) {
            return Err(ApiError::from_status(409, r#"{"error":"Email already in use"}"#));
        }

        let id = format!("u{}", accounts.len() + 100);
        let identity = identity(&id, name, email);
        accounts.insert(
            id,
            Account {
                identity: identity.clone(),
                password: password.to_string(),
            },
        );
        Ok(identity)
    }

    async fn fetch_user(&self, id: &UserId) -> Result<Identity, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }

        self.accounts
            .lock()
            .unwrap()
            .get(id.as_str())
            .map(|a| a.identity.clone())
            .ok_or_else(|| ApiError::from_status(404, r#"{"error":"User not found"}"#))
    }

    async fn update_user(&self, id: &UserId, update: &UserUpdate) -> Result<Identity, ApiError> {
        if let Some(err) = &self.update_error {
            return Err(err.clone());
        }

        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(id.as_str())
            .ok_or_else(|| ApiError::from_status(404, r#"{"error":"User not found"}"#))?;

        if let Some(name) = &update.name {
            account.identity.name = name.clone();
        }
        if let Some(email) = &update.email {
            account.identity.email = email.clone();
        }
        if let Some(password) = &update.password {
            account.password = password.clone();
        }
        Ok(account.identity.clone())
    }
}
