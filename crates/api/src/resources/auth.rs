use liftlog_core::Identity;

use crate::dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::{ApiClient, ApiError};

/// Login and registration.
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login`. A 2xx without a usable token is a decode error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest::new(email, password);
        let res: LoginResponse = self.client.post_json("/auth/login", &body).await?;
        if res.token.is_blank() {
            return Err(ApiError::Decode("login response carried an empty token".into()));
        }
        Ok(res)
    }

    /// `POST /users`. Creates the account; does not sign in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, ApiError> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.client.post_json("/users", &body).await
    }
}
