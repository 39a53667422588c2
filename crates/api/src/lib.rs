//! HTTP gateway client for the workout service.
//!
//! Every request goes through the same [`ApiClient`]; the bearer header is
//! attached by an explicit [`middleware::BearerAuth`] stage that reads the
//! credential store at send time.

pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod resources;

pub use client::{ApiClient, ApiClientBuilder};
pub use config::ApiConfig;
pub use dto::{LoginRequest, LoginResponse, RegisterRequest, UserUpdate};
pub use error::ApiError;
pub use middleware::{BearerAuth, RequestStage};
pub use resources::{AuthApi, ExercisesApi, UsersApi, WorkoutsApi};
