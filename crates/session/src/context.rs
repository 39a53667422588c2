//! Session context: the single writer of session state.
//!
//! Consumers read through [`SessionContext::snapshot`] or watch changes via
//! [`SessionContext::subscribe`]; only the operations on this type mutate the
//! state or the credential store.
//!
//! Operations are not serialized against each other. If a `login` and a
//! `logout` overlap, whichever writes last wins.

use std::sync::Arc;

use tokio::sync::watch;

use liftlog_api::{ApiError, UserUpdate};
use liftlog_auth::{AccessDecision, AccessGate, CredentialStore, token_ttl};
use liftlog_core::Identity;

use crate::error::{LOGIN_FAILED, REGISTRATION_FAILED};
use crate::{AccountGateway, Navigator, SessionError, SessionResolver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Unauthenticated,
    Authenticated(Identity),
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    fn initializing() -> Self {
        Self {
            state: SessionState::Initializing,
            is_loading: true,
            last_error: None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }
}

/// Fields the profile form submits.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    /// Only sent when the user typed a new one.
    pub password: Option<String>,
}

impl core::fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    gateway: Arc<dyn AccountGateway>,
    resolver: SessionResolver,
    navigator: Arc<dyn Navigator>,
    gate: AccessGate,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionContext {
    /// Build a context in the `Initializing` state. Call [`initialize`] next.
    ///
    /// [`initialize`]: SessionContext::initialize
    pub fn new(
        store: Arc<dyn CredentialStore>,
        gateway: Arc<dyn AccountGateway>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let resolver = SessionResolver::new(store.clone(), gateway.clone());
        let (state, _) = watch::channel(SessionSnapshot::initializing());
        Self {
            store,
            gateway,
            resolver,
            navigator,
            gate: AccessGate::default(),
            state,
        }
    }

    /// Use a non-default route partition (login/landing paths come from it).
    pub fn with_gate(mut self, gate: AccessGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    /// Hydrate the session from the credential store.
    ///
    /// Never fails: an invalid session settles as `Unauthenticated`. A
    /// transient lookup failure also settles as `Unauthenticated` for now but
    /// leaves the token in place and records the error.
    pub async fn initialize(&self) -> SessionSnapshot {
        let outcome = self.resolver.resolve_current_identity().await;

        self.state.send_modify(|s| {
            s.is_loading = false;
            match outcome {
                Ok(Some(identity)) => {
                    s.state = SessionState::Authenticated(identity);
                    s.last_error = None;
                }
                Ok(None) => {
                    s.state = SessionState::Unauthenticated;
                    s.last_error = None;
                }
                Err(e) => {
                    s.state = SessionState::Unauthenticated;
                    s.last_error = Some(e.user_message());
                }
            }
        });

        self.snapshot()
    }

    /// Sign in, store the token for seven days, then go to the landing page.
    ///
    /// On failure the previous session (if any) is left as it was and the
    /// error is both recorded in `last_error` and returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        self.begin_loading();
        let result = self.login_inner(email, password).await;
        self.finish_loading();
        result
    }

    /// Create the account, then sign in with the same credentials.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        self.begin_loading();

        let result = match self.gateway.register(name, email, password).await {
            Ok(created) => {
                tracing::info!(user_id = %created.id, "account registered");
                self.login_inner(email, password).await
            }
            Err(e) => Err(SessionError::authentication(e, REGISTRATION_FAILED)),
        };

        // A failure anywhere in the sequence is reported as a registration failure.
        let result = result.map_err(|e| match e {
            SessionError::Authentication { source, .. } => {
                SessionError::authentication(source, REGISTRATION_FAILED)
            }
            other => other,
        });
        if let Err(e) = &result {
            self.record_error(e);
        }

        self.finish_loading();
        result
    }

    /// Drop the session locally and go to the login page. No network call.
    pub fn logout(&self) {
        self.store.clear();
        self.state.send_modify(|s| {
            s.state = SessionState::Unauthenticated;
            s.is_loading = false;
            s.last_error = None;
        });
        tracing::info!("signed out");
        self.navigator.navigate(&self.gate.config().login_path);
    }

    /// Save profile changes for the signed-in user.
    ///
    /// When the e-mail changed and a new password was given, signs in again
    /// with the new credentials. The server has already accepted the change by
    /// then, so if that sign-in fails the updated identity stays applied, the
    /// previous token is kept and the failure is reported as a profile error.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, SessionError> {
        let current = self.identity().ok_or(SessionError::NotAuthenticated)?;

        let body = UserUpdate {
            name: Some(update.name.clone()),
            email: Some(update.email.clone()),
            password: update.password.clone(),
        };

        let updated = match self.gateway.update_user(&current.id, &body).await {
            Ok(updated) => updated,
            Err(e) => {
                let err = SessionError::profile(e);
                self.record_error(&err);
                return Err(err);
            }
        };

        tracing::info!(user_id = %updated.id, "profile updated");
        self.state.send_modify(|s| {
            if s.is_authenticated() {
                s.state = SessionState::Authenticated(updated.clone());
            }
            s.last_error = None;
        });

        match update.password {
            Some(password) if update.email != current.email => {
                self.login_inner(&update.email, &password).await.map_err(|e| {
                    let err = match e {
                        SessionError::Authentication { source, .. } => {
                            SessionError::profile(source)
                        }
                        other => other,
                    };
                    self.record_error(&err);
                    err
                })
            }
            _ => Ok(updated),
        }
    }

    /// Where the application root should send the user.
    pub fn landing_path(&self) -> &str {
        if self.state.borrow().is_authenticated() {
            &self.gate.config().landing_path
        } else {
            &self.gate.config().login_path
        }
    }

    /// Access-gate decision for `path` given the stored token's presence.
    pub fn check_access(&self, path: &str) -> AccessDecision {
        self.gate.decide(path, self.store.has_token())
    }

    async fn login_inner(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let response = self.gateway.login(email, password).await.and_then(|res| {
            if res.token.is_blank() {
                Err(ApiError::Decode("login response carried an empty token".into()))
            } else {
                Ok(res)
            }
        });

        match response {
            Ok(res) => {
                self.store.set(res.token, token_ttl());
                let identity = res.user;
                tracing::info!(user_id = %identity.id, "signed in");

                self.state.send_modify(|s| {
                    s.state = SessionState::Authenticated(identity.clone());
                    s.last_error = None;
                });
                self.navigator.navigate(&self.gate.config().landing_path);
                Ok(identity)
            }
            Err(e) => {
                tracing::info!(error = %e, "sign-in rejected");
                let err = SessionError::authentication(e, LOGIN_FAILED);
                self.record_error(&err);
                Err(err)
            }
        }
    }

    fn begin_loading(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.last_error = None;
        });
    }

    fn finish_loading(&self) {
        self.state.send_modify(|s| s.is_loading = false);
    }

    fn record_error(&self, err: &SessionError) {
        let message = err.user_message();
        self.state.send_modify(|s| s.last_error = Some(message));
    }
}
