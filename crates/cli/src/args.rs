//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use liftlog_api::config::{API_URL_ENV, DEFAULT_API_URL, TIMEOUT_ENV};
use liftlog_core::{ExerciseId, MuscleGroup, WorkoutId};

#[derive(Debug, Parser)]
#[command(name = "liftlog", author, version, about = "Workout tracker client", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Base URL of the workout service.
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Where the session token is kept (default: platform data dir).
    #[arg(long, global = true, env = "LIFTLOG_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout.
    #[arg(
        long,
        global = true,
        env = TIMEOUT_ENV,
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LIFTLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account, then sign in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LIFTLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session.
    Logout,

    /// Show who the stored session belongs to.
    Whoami,

    /// Show where a navigation to PATH would end up.
    Gate { path: String },

    /// Update the signed-in user's profile.
    Profile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// New password; when the e-mail also changes, signs in again with it.
        #[arg(long)]
        password: Option<String>,
    },

    #[command(subcommand)]
    Workouts(WorkoutsCommand),

    #[command(subcommand)]
    Exercises(ExercisesCommand),
}

#[derive(Debug, Subcommand)]
pub enum WorkoutsCommand {
    List,
    Show { id: WorkoutId },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename or re-describe a workout; omitted fields keep their value.
    Update {
        id: WorkoutId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: WorkoutId },
    /// Add an exercise to a workout.
    AddExercise {
        workout: WorkoutId,
        #[arg(long)]
        exercise: ExerciseId,
        #[arg(long)]
        sets: u32,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        weight: Option<f64>,
        /// Rest between sets, in seconds.
        #[arg(long)]
        rest: Option<u32>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExercisesCommand {
    List,
    Show { id: ExerciseId },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        muscle_group: MuscleGroup,
    },
}
