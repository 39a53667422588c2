use liftlog_core::{Identity, UserId};

use crate::client::path_segment;
use crate::dto::UserUpdate;
use crate::{ApiClient, ApiError};

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /users/{id}`
    pub async fn get(&self, id: &UserId) -> Result<Identity, ApiError> {
        let path = format!("/users/{}", path_segment(id.as_str())?);
        self.client.get_json(&path).await
    }

    /// `PUT /users/{id}`
    pub async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<Identity, ApiError> {
        let path = format!("/users/{}", path_segment(id.as_str())?);
        self.client.put_json(&path, update).await
    }
}
