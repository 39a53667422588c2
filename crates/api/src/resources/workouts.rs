use liftlog_core::{Workout, WorkoutDraft, WorkoutExercise, WorkoutExerciseDraft, WorkoutId};

use crate::client::path_segment;
use crate::{ApiClient, ApiError};

/// The signed-in user's workouts. The server scopes these by bearer token.
pub struct WorkoutsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> WorkoutsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Workout>, ApiError> {
        self.client.get_json("/workouts").await
    }

    pub async fn get(&self, id: &WorkoutId) -> Result<Workout, ApiError> {
        self.client.get_json(&workout_path(id)?).await
    }

    pub async fn create(&self, draft: &WorkoutDraft) -> Result<Workout, ApiError> {
        self.client.post_json("/workouts", draft).await
    }

    pub async fn update(&self, id: &WorkoutId, draft: &WorkoutDraft) -> Result<Workout, ApiError> {
        self.client.put_json(&workout_path(id)?, draft).await
    }

    pub async fn delete(&self, id: &WorkoutId) -> Result<(), ApiError> {
        self.client.delete(&workout_path(id)?).await
    }

    /// `POST /workouts/{id}/exercises`
    pub async fn add_exercise(
        &self,
        workout_id: &WorkoutId,
        draft: &WorkoutExerciseDraft,
    ) -> Result<WorkoutExercise, ApiError> {
        let path = format!("{}/exercises", workout_path(workout_id)?);
        self.client.post_json(&path, draft).await
    }
}

fn workout_path(id: &WorkoutId) -> Result<String, ApiError> {
    Ok(format!("/workouts/{}", path_segment(id.as_str())?))
}
