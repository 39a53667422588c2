use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use liftlog_api::{ApiClient, ApiConfig, ApiError, UserUpdate};
use liftlog_auth::{BearerToken, CredentialStore, MemoryCredentialStore, token_ttl};
use liftlog_core::{
    ExerciseDraft, ExerciseId, MuscleGroup, UserId, WorkoutDraft, WorkoutExerciseDraft, WorkoutId,
};

#[derive(Clone, Default)]
struct Seen {
    authorization: Arc<Mutex<Vec<Option<String>>>>,
}

impl Seen {
    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.authorization.lock().unwrap().push(value);
    }

    fn all(&self) -> Vec<Option<String>> {
        self.authorization.lock().unwrap().clone()
    }
}

struct TestServer {
    base_url: String,
    seen: Seen,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let seen = Seen::default();
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/users", post(register))
            .route("/api/users/:id", get(get_user).put(update_user))
            .route("/api/workouts", get(list_workouts).post(create_workout))
            .route(
                "/api/workouts/:id",
                get(get_workout).put(update_workout).delete(delete_workout),
            )
            .route("/api/workouts/:id/exercises", post(add_exercise))
            .route("/api/exercises", get(list_exercises).post(create_exercise))
            .route("/api/exercises/:id", get(get_exercise))
            .route("/api/admin", get(admin).put(admin))
            .route("/api/broken", get(broken))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, seen, handle }
    }

    fn client(&self, store: Arc<dyn CredentialStore>) -> ApiClient {
        ApiClient::new(ApiConfig::new(self.base_url.clone()), store).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(user_id: &str) -> String {
    let now = Utc::now();
    let claims = json!({
        "id": user_id,
        "iat": now.timestamp(),
        "exp": (now + Duration::days(1)).timestamp(),
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("failed to encode jwt")
}

fn user_json(id: &str, name: &str, email: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": email,
        "role": "user",
        "createdAt": "2024-03-01T10:00:00Z",
    })
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["email"] == "blank@b.com" {
        return (
            StatusCode::OK,
            Json(json!({ "token": "", "user": user_json("u3", "B", "blank@b.com") })),
        );
    }
    if body["email"] == "a@b.com" && body["password"] == "secret" {
        (
            StatusCode::OK,
            Json(json!({ "token": mint_jwt("u1"), "user": user_json("u1", "A", "a@b.com") })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" })))
    }
}

async fn register(Json(body): Json<Value>) -> impl IntoResponse {
    let name = body["name"].as_str().unwrap_or_default();
    let email = body["email"].as_str().unwrap_or_default();
    (StatusCode::CREATED, Json(user_json("u2", name, email)))
}

async fn get_user(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    seen.record(&headers);
    if id == "u1" {
        (StatusCode::OK, Json(user_json("u1", "A", "a@b.com")))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "User not found" })))
    }
}

async fn update_user(Path(id): Path<String>, Json(body): Json<Value>) -> impl IntoResponse {
    let name = body["name"].as_str().unwrap_or("A");
    let email = body["email"].as_str().unwrap_or("a@b.com");
    Json(user_json(&id, name, email))
}

async fn list_workouts(State(seen): State<Seen>, headers: HeaderMap) -> impl IntoResponse {
    seen.record(&headers);
    Json(json!([{
        "id": "w1",
        "name": "Push day",
        "description": "chest and triceps",
        "createdAt": "2024-03-02T08:00:00Z",
        "exercises": []
    }]))
}

async fn create_workout(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    seen.record(&headers);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "w2",
            "name": body["name"],
            "description": body["description"],
            "userId": "u1",
            "createdAt": "2024-03-02T08:00:00Z"
        })),
    )
}

fn workout_json(id: &str, name: &Value, description: &Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": description,
        "userId": "u1",
        "createdAt": "2024-03-02T08:00:00Z",
        "exercises": [{
            "id": "we1",
            "workoutId": id,
            "exerciseId": "e1",
            "sets": 3,
            "reps": 8,
            "weight": 80.0,
            "exercise": { "id": "e1", "name": "Bench press", "muscleGroup": "Chest" }
        }]
    })
}

async fn get_workout(Path(id): Path<String>) -> impl IntoResponse {
    if id == "w1" {
        (StatusCode::OK, Json(workout_json(&id, &json!("Push day"), &json!("chest"))))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "Workout not found" })))
    }
}

async fn update_workout(Path(id): Path<String>, Json(body): Json<Value>) -> impl IntoResponse {
    Json(workout_json(&id, &body["name"], &body["description"]))
}

async fn delete_workout(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> StatusCode {
    seen.record(&headers);
    StatusCode::NO_CONTENT
}

async fn add_exercise(Path(id): Path<String>, Json(body): Json<Value>) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "we1",
            "workoutId": id,
            "exerciseId": body["exerciseId"],
            "sets": body["sets"],
            "reps": body["reps"],
            "restTime": body.get("restTime").cloned().unwrap_or(Value::Null)
        })),
    )
}

async fn list_exercises() -> impl IntoResponse {
    Json(json!([
        {
            "id": "e1",
            "name": "Bench press",
            "description": "",
            "muscleGroup": "Chest",
            "createdAt": "2024-01-01T00:00:00Z"
        },
        { "id": "e2", "name": "Burpee", "description": "", "muscleGroup": "Full Body" }
    ]))
}

async fn get_exercise(Path(id): Path<String>) -> impl IntoResponse {
    if id == "e1" {
        (
            StatusCode::OK,
            Json(json!({
                "id": "e1",
                "name": "Bench press",
                "description": "",
                "muscleGroup": "Chest"
            })),
        )
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "Exercise not found" })))
    }
}

async fn create_exercise(Json(body): Json<Value>) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "e9",
            "name": body["name"],
            "description": body["description"],
            "muscleGroup": body["muscleGroup"],
            "createdAt": "2024-03-03T00:00:00Z"
        })),
    )
}

/// Anything that lands here escaped the resource it was addressed to.
async fn admin() -> impl IntoResponse {
    Json(user_json("root", "Root", "root@x.com"))
}

async fn broken() -> impl IntoResponse {
    (StatusCode::OK, "this is not json")
}

#[tokio::test]
async fn requests_carry_the_stored_bearer_token() {
    let srv = TestServer::spawn().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let client = srv.client(store.clone());

    client.workouts().list().await.unwrap();

    store.set(BearerToken::from("t1"), token_ttl());
    client.workouts().list().await.unwrap();

    store.clear();
    client.workouts().list().await.unwrap();

    assert_eq!(
        srv.seen.all(),
        vec![None, Some("Bearer t1".to_string()), None]
    );
}

#[tokio::test]
async fn login_returns_token_and_identity() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let res = client.auth().login("a@b.com", "secret").await.unwrap();
    assert_eq!(res.user.email, "a@b.com");
    assert_eq!(res.user.id.as_str(), "u1");
    assert!(!res.token.is_blank());
}

#[tokio::test]
async fn failed_login_surfaces_server_message() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let err = client.auth().login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.server_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn register_then_update_profile() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let created = client.auth().register("Jo", "jo@x.com", "pw123456").await.unwrap();
    assert_eq!(created.name, "Jo");
    assert_eq!(created.email, "jo@x.com");

    let update = UserUpdate {
        name: Some("Joanne".into()),
        ..Default::default()
    };
    let updated = client.users().update(&created.id, &update).await.unwrap();
    assert_eq!(updated.name, "Joanne");
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let err = client.users().get(&UserId::new("ghost").unwrap()).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.invalidates_session());
}

#[tokio::test]
async fn workout_lifecycle_calls() {
    let srv = TestServer::spawn().await;
    let store = Arc::new(MemoryCredentialStore::new());
    store.set(BearerToken::from("t1"), token_ttl());
    let client = srv.client(store);

    let workouts = client.workouts().list().await.unwrap();
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].name, "Push day");

    let created = client
        .workouts()
        .create(&WorkoutDraft {
            name: "Leg day".into(),
            description: "squats".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.id.as_str(), "w2");
    assert_eq!(created.user_id.map(|u| u.into_inner()), Some("u1".to_string()));

    let link = client
        .workouts()
        .add_exercise(
            &created.id,
            &WorkoutExerciseDraft {
                exercise_id: ExerciseId::new("e1").unwrap(),
                sets: 5,
                reps: 5,
                weight: None,
                rest_time: Some(120),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(link.workout_id.as_str(), "w2");
    assert_eq!(link.sets, 5);
    assert_eq!(link.rest_time, Some(120));

    client.workouts().delete(&WorkoutId::new("w2").unwrap()).await.unwrap();

    assert!(srv.seen.all().iter().all(|h| h.as_deref() == Some("Bearer t1")));
}

#[tokio::test]
async fn exercises_decode_catalogue_groups() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let exercises = client.exercises().list().await.unwrap();
    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[1].muscle_group, MuscleGroup::FullBody);
    assert!(exercises[1].created_at.is_none());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let err = client.get_json::<Value>("/broken").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(
        ApiConfig::new(format!("http://{addr}/api")),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();

    let err = client.workouts().list().await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn blank_login_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let err = client.auth().login("blank@b.com", "secret").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn crafted_ids_stay_inside_their_resource() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let crafted = UserId::new("../admin").unwrap();
    let err = client.users().get(&crafted).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err:?}");

    let updated = client
        .users()
        .update(&crafted, &UserUpdate::default())
        .await
        .unwrap();
    assert_eq!(updated.id.as_str(), "../admin");

    let err = client.users().get(&UserId::new("..").unwrap()).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl(_)));
}

#[tokio::test]
async fn show_and_edit_workout() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));
    let id = WorkoutId::new("w1").unwrap();

    let workout = client.workouts().get(&id).await.unwrap();
    assert_eq!(workout.name, "Push day");
    assert_eq!(workout.exercises[0].weight, Some(80.0));
    assert_eq!(
        workout.exercises[0].exercise.as_ref().map(|e| e.name.as_str()),
        Some("Bench press")
    );

    let edited = client
        .workouts()
        .update(
            &id,
            &WorkoutDraft {
                name: "Push day (heavy)".into(),
                description: "5x5".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.id, id);
    assert_eq!(edited.name, "Push day (heavy)");
    assert_eq!(edited.description, "5x5");

    let err = client
        .workouts()
        .get(&WorkoutId::new("w404").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.server_message(), Some("Workout not found"));
}

#[tokio::test]
async fn show_and_create_exercise() {
    let srv = TestServer::spawn().await;
    let client = srv.client(Arc::new(MemoryCredentialStore::new()));

    let bench = client.exercises().get(&ExerciseId::new("e1").unwrap()).await.unwrap();
    assert_eq!(bench.muscle_group, MuscleGroup::Chest);

    let created = client
        .exercises()
        .create(&ExerciseDraft {
            name: "Burpee".into(),
            description: "up and down".into(),
            muscle_group: MuscleGroup::FullBody,
        })
        .await
        .unwrap();
    assert_eq!(created.id.as_str(), "e9");
    assert_eq!(created.muscle_group, MuscleGroup::FullBody);
    assert!(created.created_at.is_some());
}
