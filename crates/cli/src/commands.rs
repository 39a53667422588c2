//! Command handlers. Each one drives the session core or the API client and
//! prints a short result.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Serialize;

use liftlog_api::{ApiClient, ApiConfig};
use liftlog_auth::{AccessDecision, FileCredentialStore};
use liftlog_core::{
    Exercise, ExerciseDraft, Identity, Workout, WorkoutDraft, WorkoutExerciseDraft,
};
use liftlog_session::{NavigationLog, ProfileUpdate, SessionContext, SessionState};

use crate::args::{Command, ExercisesCommand, GlobalArgs, WorkoutsCommand};

pub struct App {
    client: ApiClient,
    session: SessionContext,
    nav: Arc<NavigationLog>,
    json: bool,
}

impl App {
    pub fn open(global: &GlobalArgs) -> anyhow::Result<Self> {
        let dir = match &global.data_dir {
            Some(dir) => dir.clone(),
            None => FileCredentialStore::default_dir()
                .context("no data directory found; pass --data-dir")?,
        };
        let store = Arc::new(
            FileCredentialStore::open(&dir)
                .with_context(|| format!("failed to open credential store in {}", dir.display()))?,
        );

        let config = ApiConfig::new(global.api_url.clone())
            .with_timeout(Duration::from_secs(global.timeout_secs));
        let client = ApiClient::new(config, store.clone()).context("failed to build API client")?;

        let nav = Arc::new(NavigationLog::new());
        let session = SessionContext::new(store, Arc::new(client.clone()), nav.clone());

        tracing::debug!(api_url = %client.base_url(), data_dir = %dir.display(), "liftlog ready");
        Ok(Self {
            client,
            session,
            nav,
            json: global.json,
        })
    }

    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Login { email, password } => {
                let identity = self.session.login(&email, &password).await?;
                self.emit(&identity, || format!("Signed in as {}", describe_identity(&identity)));
                self.report_navigation();
            }
            Command::Register { name, email, password } => {
                let identity = self.session.register(&name, &email, &password).await?;
                self.emit(&identity, || {
                    format!("Registered and signed in as {}", describe_identity(&identity))
                });
                self.report_navigation();
            }
            Command::Logout => {
                self.session.logout();
                println!("Signed out");
                self.report_navigation();
            }
            Command::Whoami => {
                let identity = self.require_session().await?;
                self.emit(&identity, || describe_identity(&identity));
            }
            Command::Gate { path } => {
                let decision = self.session.check_access(&path);
                println!("{}", describe_decision(&decision));
            }
            Command::Profile { name, email, password } => {
                self.require_session().await?;
                let identity = self
                    .session
                    .update_profile(ProfileUpdate { name, email, password })
                    .await?;
                self.emit(&identity, || format!("Profile saved: {}", describe_identity(&identity)));
            }
            Command::Workouts(cmd) => self.workouts(cmd).await?,
            Command::Exercises(cmd) => self.exercises(cmd).await?,
        }
        Ok(())
    }

    async fn workouts(&self, cmd: WorkoutsCommand) -> anyhow::Result<()> {
        let api = self.client.workouts();
        match cmd {
            WorkoutsCommand::List => {
                let workouts = api.list().await.context("failed to load workouts")?;
                self.emit(&workouts, || lines(&workouts, describe_workout));
            }
            WorkoutsCommand::Show { id } => {
                let workout = api
                    .get(&id)
                    .await
                    .with_context(|| format!("failed to load workout {id}"))?;
                self.emit(&workout, || describe_workout_detail(&workout));
            }
            WorkoutsCommand::Create { name, description } => {
                let draft = WorkoutDraft { name, description };
                draft.validate()?;
                let workout = api.create(&draft).await.context("failed to create workout")?;
                self.emit(&workout, || format!("Created {}", describe_workout(&workout)));
            }
            WorkoutsCommand::Update { id, name, description } => {
                let current = api
                    .get(&id)
                    .await
                    .with_context(|| format!("failed to load workout {id}"))?;
                let draft = edited_draft(&current, name, description);
                draft.validate()?;
                let workout = api
                    .update(&id, &draft)
                    .await
                    .with_context(|| format!("failed to update workout {id}"))?;
                self.emit(&workout, || format!("Updated {}", describe_workout(&workout)));
            }
            WorkoutsCommand::Delete { id } => {
                api.delete(&id)
                    .await
                    .with_context(|| format!("failed to delete workout {id}"))?;
                println!("Deleted workout {id}");
            }
            WorkoutsCommand::AddExercise {
                workout,
                exercise,
                sets,
                reps,
                weight,
                rest,
                notes,
            } => {
                let draft = WorkoutExerciseDraft {
                    exercise_id: exercise,
                    sets,
                    reps,
                    weight,
                    rest_time: rest,
                    notes,
                };
                draft.validate()?;
                let added = api
                    .add_exercise(&workout, &draft)
                    .await
                    .with_context(|| format!("failed to add exercise to workout {workout}"))?;
                self.emit(&added, || {
                    format!(
                        "Added exercise {} to workout {}: {}",
                        added.exercise_id,
                        workout,
                        prescription(added.sets, added.reps, added.weight)
                    )
                });
            }
        }
        Ok(())
    }

    async fn exercises(&self, cmd: ExercisesCommand) -> anyhow::Result<()> {
        let api = self.client.exercises();
        match cmd {
            ExercisesCommand::List => {
                let exercises = api.list().await.context("failed to load exercises")?;
                self.emit(&exercises, || lines(&exercises, describe_exercise));
            }
            ExercisesCommand::Show { id } => {
                let exercise = api
                    .get(&id)
                    .await
                    .with_context(|| format!("failed to load exercise {id}"))?;
                self.emit(&exercise, || describe_exercise(&exercise));
            }
            ExercisesCommand::Create {
                name,
                description,
                muscle_group,
            } => {
                let draft = ExerciseDraft {
                    name,
                    description,
                    muscle_group,
                };
                draft.validate()?;
                let exercise = api.create(&draft).await.context("failed to create exercise")?;
                self.emit(&exercise, || format!("Created {}", describe_exercise(&exercise)));
            }
        }
        Ok(())
    }

    /// Resolve the stored session, failing when nobody is signed in.
    async fn require_session(&self) -> anyhow::Result<Identity> {
        let snapshot = self.session.initialize().await;
        match snapshot.state {
            SessionState::Authenticated(identity) => Ok(identity),
            _ => match snapshot.last_error {
                Some(err) => bail!("could not confirm the stored session: {err}"),
                None => bail!("not signed in; run `liftlog login` first"),
            },
        }
    }

    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce() -> String) {
        if self.json {
            match serde_json::to_string_pretty(value) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!(error = %e, "failed to render JSON output"),
            }
        } else {
            println!("{}", human());
        }
    }

    fn report_navigation(&self) {
        if let Some(path) = self.nav.last() {
            tracing::info!(path = %path, "navigated");
        }
    }
}

/// Form contents for editing `current`, with only the given fields replaced.
fn edited_draft(
    current: &Workout,
    name: Option<String>,
    description: Option<String>,
) -> WorkoutDraft {
    WorkoutDraft {
        name: name.unwrap_or_else(|| current.name.clone()),
        description: description.unwrap_or_else(|| current.description.clone()),
    }
}

fn lines<T>(items: &[T], describe: fn(&T) -> String) -> String {
    items.iter().map(describe).collect::<Vec<_>>().join("\n")
}

fn describe_identity(identity: &Identity) -> String {
    format!(
        "{} <{}> ({}, {})",
        identity.name,
        identity.email,
        identity.id,
        identity.role.as_str()
    )
}

fn describe_decision(decision: &AccessDecision) -> String {
    match decision {
        AccessDecision::Allow => "allow".to_string(),
        AccessDecision::RedirectTo(target) => format!("redirect {target}"),
    }
}

fn describe_workout(workout: &Workout) -> String {
    format!(
        "{}  {}  ({} exercises, {})",
        workout.id,
        workout.name,
        workout.exercises.len(),
        workout.created_at.format("%Y-%m-%d")
    )
}

fn describe_workout_detail(workout: &Workout) -> String {
    let mut out = describe_workout(workout);
    if !workout.description.is_empty() {
        out.push_str(&format!("\n  {}", workout.description));
    }
    for entry in &workout.exercises {
        let name = entry
            .exercise
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or(entry.exercise_id.as_str());
        let prescribed = prescription(entry.sets, entry.reps, entry.weight);
        out.push_str(&format!("\n  - {name}: {prescribed}"));
        if let Some(rest) = entry.rest_time {
            out.push_str(&format!(", rest {rest}s"));
        }
    }
    out
}

fn describe_exercise(exercise: &Exercise) -> String {
    format!("{}  {}  [{}]", exercise.id, exercise.name, exercise.muscle_group)
}

fn prescription(sets: u32, reps: u32, weight: Option<f64>) -> String {
    match weight {
        Some(w) => format!("{sets}x{reps} @ {w}kg"),
        None => format!("{sets}x{reps}"),
    }
}
