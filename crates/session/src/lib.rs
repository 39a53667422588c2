//! `liftlog-session`: who is signed in, and how that changes.
//!
//! [`SessionResolver`] turns a stored token into a confirmed [`Identity`];
//! [`SessionContext`] is the single writer of session state and exposes
//! login/register/logout to the rest of the application.
//!
//! [`Identity`]: liftlog_core::Identity

pub mod context;
pub mod error;
pub mod gateway;
pub mod navigator;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use context::{ProfileUpdate, SessionContext, SessionSnapshot, SessionState};
pub use error::SessionError;
pub use gateway::AccountGateway;
pub use navigator::{NavigationLog, Navigator};
pub use resolver::SessionResolver;
