//! Errors raised while building or checking domain values locally.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Rejections that happen before anything is sent to the server.
///
/// Server-side failures are `liftlog_api::ApiError`, not this.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A form field is missing or out of range. The message names the field.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Not one of the groups in `MuscleGroup::CATALOGUE`.
    #[error("unknown muscle group `{0}`")]
    UnknownMuscleGroup(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
