//! `liftlog-core`: domain records shared by the client crates.
//!
//! This crate contains **pure data** (no HTTP, no storage): identifiers, the
//! resolved user identity, and the workout/exercise records the remote service
//! returns.

pub mod error;
pub mod id;
pub mod identity;
pub mod training;

pub use error::{DomainError, DomainResult};
pub use id::{ExerciseId, UserId, WorkoutExerciseId, WorkoutId};
pub use identity::{Identity, Role};
pub use training::{
    Exercise, ExerciseDraft, MuscleGroup, Workout, WorkoutDraft, WorkoutExercise,
    WorkoutExerciseDraft,
};
