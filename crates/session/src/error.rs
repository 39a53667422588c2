use thiserror::Error;

use liftlog_api::ApiError;

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Login or registration did not go through. `message` is what the form shows.
    #[error("{message}")]
    Authentication {
        message: String,
        #[source]
        source: ApiError,
    },

    /// The profile update was rejected or never reached the server.
    #[error("{message}")]
    Profile {
        message: String,
        #[source]
        source: ApiError,
    },

    /// Identity resolution hit a transient failure; the stored token was kept.
    #[error("could not reach the server to confirm the session: {0}")]
    Transport(#[source] ApiError),

    #[error("not signed in")]
    NotAuthenticated,
}

impl SessionError {
    pub(crate) fn authentication(source: ApiError, fallback: &str) -> Self {
        Self::Authentication {
            message: user_message(&source, fallback),
            source,
        }
    }

    pub(crate) fn profile(source: ApiError) -> Self {
        Self::Profile {
            message: user_message(&source, PROFILE_UPDATE_FAILED),
            source,
        }
    }

    /// Text suitable for an inline form error.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SessionError::Authentication { source, .. }
            | SessionError::Profile { source, .. }
            | SessionError::Transport(source) => Some(source),
            SessionError::NotAuthenticated => None,
        }
    }
}

/// The server's own message when it sent one, else `fallback`.
pub(crate) fn user_message(err: &ApiError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_string()
}
