use liftlog_core::{Exercise, ExerciseDraft, ExerciseId};

use crate::client::path_segment;
use crate::{ApiClient, ApiError};

/// Shared exercise catalogue.
pub struct ExercisesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ExercisesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Exercise>, ApiError> {
        self.client.get_json("/exercises").await
    }

    pub async fn get(&self, id: &ExerciseId) -> Result<Exercise, ApiError> {
        let path = format!("/exercises/{}", path_segment(id.as_str())?);
        self.client.get_json(&path).await
    }

    pub async fn create(&self, draft: &ExerciseDraft) -> Result<Exercise, ApiError> {
        self.client.post_json("/exercises", draft).await
    }
}
