//! Endpoint groups, one per remote resource.

mod auth;
mod exercises;
mod users;
mod workouts;

pub use auth::AuthApi;
pub use exercises::ExercisesApi;
pub use users::UsersApi;
pub use workouts::WorkoutsApi;
