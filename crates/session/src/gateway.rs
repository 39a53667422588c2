//! The account calls the session layer needs from the remote service.

use async_trait::async_trait;

use liftlog_api::{ApiClient, ApiError, LoginResponse, UserUpdate};
use liftlog_core::{Identity, UserId};

#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<Identity, ApiError>;

    async fn fetch_user(&self, id: &UserId) -> Result<Identity, ApiError>;

    async fn update_user(&self, id: &UserId, update: &UserUpdate) -> Result<Identity, ApiError>;
}

#[async_trait]
impl AccountGateway for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.auth().login(email, password).await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, ApiError> {
        self.auth().register(name, email, password).await
    }

    async fn fetch_user(&self, id: &UserId) -> Result<Identity, ApiError> {
        self.users().get(id).await
    }

    async fn update_user(&self, id: &UserId, update: &UserUpdate) -> Result<Identity, ApiError> {
        self.users().update(id, update).await
    }
}
