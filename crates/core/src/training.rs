//! Workout and exercise records, plus the payloads used to create them.
//!
//! Field names follow the service's camelCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult, ExerciseId, UserId, WorkoutExerciseId, WorkoutId};

/// Muscle group an exercise targets.
///
/// The catalogue the service ships with uses the named variants; anything else
/// it returns is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    FullBody,
    Cardio,
    Other(String),
}

impl MuscleGroup {
    /// The groups offered when creating an exercise.
    pub const CATALOGUE: [MuscleGroup; 8] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Shoulders,
        MuscleGroup::Arms,
        MuscleGroup::Legs,
        MuscleGroup::Core,
        MuscleGroup::FullBody,
        MuscleGroup::Cardio,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Arms => "Arms",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Core => "Core",
            MuscleGroup::FullBody => "Full Body",
            MuscleGroup::Cardio => "Cardio",
            MuscleGroup::Other(s) => s,
        }
    }
}

impl From<String> for MuscleGroup {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Chest" => MuscleGroup::Chest,
            "Back" => MuscleGroup::Back,
            "Shoulders" => MuscleGroup::Shoulders,
            "Arms" => MuscleGroup::Arms,
            "Legs" => MuscleGroup::Legs,
            "Core" => MuscleGroup::Core,
            "Full Body" => MuscleGroup::FullBody,
            "Cardio" => MuscleGroup::Cardio,
            _ => MuscleGroup::Other(value),
        }
    }
}

impl From<MuscleGroup> for String {
    fn from(value: MuscleGroup) -> Self {
        match value {
            MuscleGroup::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl core::str::FromStr for MuscleGroup {
    type Err = DomainError;

    /// Case-insensitive match against the catalogue; unknown names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MuscleGroup::CATALOGUE
            .iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .cloned()
            .ok_or_else(|| DomainError::UnknownMuscleGroup(s.trim().to_string()))
    }
}

impl core::fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exercise from the shared catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub muscle_group: MuscleGroup,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An exercise slotted into a workout with its prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub id: WorkoutExerciseId,
    pub exercise_id: ExerciseId,
    pub workout_id: WorkoutId,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Rest between sets, in seconds.
    #[serde(default)]
    pub rest_time: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercise: Option<Exercise>,
}

/// A user's workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: WorkoutId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /exercises`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDraft {
    pub name: String,
    pub description: String,
    pub muscle_group: MuscleGroup,
}

impl ExerciseDraft {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)
    }
}

/// Payload for `POST /workouts` and `PUT /workouts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    pub name: String,
    pub description: String,
}

impl WorkoutDraft {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)
    }
}

/// Payload for `POST /workouts/{id}/exercises`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseDraft {
    pub exercise_id: ExerciseId,
    pub sets: u32,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WorkoutExerciseDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.sets == 0 {
            return Err(DomainError::validation("sets must be at least 1"));
        }
        if self.reps == 0 {
            return Err(DomainError::validation("reps must be at least 1"));
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(DomainError::validation("weight must be a non-negative number"));
            }
        }
        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}
