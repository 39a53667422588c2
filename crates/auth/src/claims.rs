//! Non-authoritative look inside a bearer token.
//!
//! The client never verifies signatures. The payload is decoded only to learn
//! which user record to ask the server for; the server's answer to
//! `GET /users/{id}` is the only trust decision.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use liftlog_core::UserId;

use crate::BearerToken;

/// Claims read from a token payload without signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedClaims {
    /// Subject identifier (`id`, falling back to `sub`).
    pub subject: UserId,

    /// `exp`, when present.
    pub expires_at: Option<DateTime<Utc>>,

    /// `iat`, when present.
    pub issued_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenDecodeError {
    #[error("token has no payload segment")]
    MissingPayload,

    #[error("token payload is not valid base64url")]
    InvalidBase64,

    #[error("token payload is not a JSON object: {0}")]
    InvalidJson(String),

    #[error("token payload carries no subject")]
    MissingSubject,
}

/// Decode the payload segment of a JWT-shaped token.
///
/// Accepts both unpadded base64url and the padded/standard alphabet some
/// issuers emit. Does not look at the header or the signature.
pub fn peek_claims(token: &BearerToken) -> Result<UnverifiedClaims, TokenDecodeError> {
    let payload = token
        .as_str()
        .split('.')
        .nth(1)
        .filter(|s| !s.is_empty())
        .ok_or(TokenDecodeError::MissingPayload)?;

    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|_| TokenDecodeError::InvalidBase64)?;

    let object: Map<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|e| TokenDecodeError::InvalidJson(e.to_string()))?;

    let subject = ["id", "sub"]
        .iter()
        .find_map(|key| object.get(*key).and_then(subject_string))
        .and_then(|raw| UserId::new(raw).ok())
        .ok_or(TokenDecodeError::MissingSubject)?;

    Ok(UnverifiedClaims {
        subject,
        expires_at: object.get("exp").and_then(unix_seconds),
        issued_at: object.get("iat").and_then(unix_seconds),
    })
}

fn subject_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn unix_seconds(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_i64()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}
