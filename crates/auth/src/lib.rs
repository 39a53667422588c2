//! `liftlog-auth`: client-side session primitives.
//!
//! This crate is intentionally decoupled from HTTP: it owns the bearer token,
//! where it is kept, and the path-based access decision made before a page
//! renders. Nothing here talks to the network.

pub mod claims;
pub mod clock;
pub mod gate;
pub mod store;
pub mod token;

pub use claims::{TokenDecodeError, UnverifiedClaims, peek_claims};
pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::{AccessDecision, AccessGate, GateConfig, RouteClass, DASHBOARD_PATH, LOGIN_PATH};
pub use store::{
    CredentialStore, FileCredentialStore, MAX_TTL_DAYS, MemoryCredentialStore, StorageError,
    StoredCredential,
};
pub use token::{BearerToken, TOKEN_TTL_SECS, token_ttl};
