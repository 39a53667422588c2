use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use liftlog_api::{ApiClient, ApiConfig};
use liftlog_auth::{AccessDecision, CredentialStore, FileCredentialStore};
use liftlog_session::{NavigationLog, SessionContext, SessionState};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/users/:id", get(get_user));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
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
        "exp": (now + Duration::days(7)).timestamp(),
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("failed to encode jwt")
}

fn alice() -> Value {
    json!({
        "id": "u1",
        "name": "Alice",
        "email": "a@b.com",
        "role": "user",
        "createdAt": "2024-03-01T10:00:00Z",
    })
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["email"] == "a@b.com" && body["password"] == "secret" {
        (StatusCode::OK, Json(json!({ "token": mint_jwt("u1"), "user": alice() })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" })))
    }
}

async fn get_user(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    if !headers.contains_key(axum::http::header::AUTHORIZATION) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "No token provided" })));
    }
    if id == "u1" {
        (StatusCode::OK, Json(alice()))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "User not found" })))
    }
}

struct App {
    store: Arc<FileCredentialStore>,
    nav: Arc<NavigationLog>,
    ctx: SessionContext,
}

fn app(srv: &TestServer, dir: &std::path::Path) -> App {
    let store = Arc::new(FileCredentialStore::open(dir).unwrap());
    let client = ApiClient::new(ApiConfig::new(srv.base_url.clone()), store.clone()).unwrap();
    let nav = Arc::new(NavigationLog::new());
    let ctx = SessionContext::new(store.clone(), Arc::new(client), nav.clone());
    App { store, nav, ctx }
}

#[tokio::test]
async fn session_survives_a_restart() {
    let srv = TestServer::spawn().await;
    let dir = tempfile::tempdir().unwrap();

    let first = app(&srv, dir.path());
    assert_eq!(first.ctx.initialize().await.state, SessionState::Unauthenticated);
    assert_eq!(
        first.ctx.check_access("/dashboard"),
        AccessDecision::RedirectTo("/login?redirect=/dashboard".into())
    );

    first.ctx.login("a@b.com", "secret").await.unwrap();
    assert_eq!(first.nav.last().as_deref(), Some("/dashboard"));
    assert!(first.store.path().exists());
    drop(first);

    let second = app(&srv, dir.path());
    let snap = second.ctx.initialize().await;
    assert_eq!(snap.identity().map(|i| i.name.as_str()), Some("Alice"));
    assert!(second.ctx.check_access("/dashboard").is_allow());
    assert_eq!(
        second.ctx.check_access("/login"),
        AccessDecision::RedirectTo("/dashboard".into())
    );
}

#[tokio::test]
async fn rejected_login_leaves_nothing_on_disk() {
    let srv = TestServer::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&srv, dir.path());
    app.ctx.initialize().await;

    let err = app.ctx.login("a@b.com", "nope").await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid credentials");
    assert_eq!(app.ctx.last_error().as_deref(), Some("Invalid credentials"));
    assert!(!app.store.has_token());
    assert!(app.nav.history().is_empty());
}

#[tokio::test]
async fn logout_removes_the_persisted_token() {
    let srv = TestServer::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&srv, dir.path());

    app.ctx.login("a@b.com", "secret").await.unwrap();
    app.ctx.logout();

    assert!(!app.store.path().exists());
    assert_eq!(app.nav.last().as_deref(), Some("/login"));

    let reopened = FileCredentialStore::open(dir.path()).unwrap();
    assert!(reopened.get().is_none());
}

#[tokio::test]
async fn token_for_a_deleted_account_is_discarded() {
    let srv = TestServer::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&srv, dir.path());

    app.store.set(mint_jwt("gone").into(), liftlog_auth::token_ttl());

    let snap = app.ctx.initialize().await;
    assert_eq!(snap.state, SessionState::Unauthenticated);
    assert_eq!(snap.last_error, None);
    assert!(!app.store.has_token());
}

#[tokio::test]
async fn unreachable_server_keeps_the_token() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCredentialStore::open(dir.path()).unwrap());
    store.set(mint_jwt("u1").into(), liftlog_auth::token_ttl());

    let client = ApiClient::new(ApiConfig::new("http://127.0.0.1:9/api"), store.clone()).unwrap();
    let ctx = SessionContext::new(store.clone(), Arc::new(client), Arc::new(NavigationLog::new()));

    let snap = ctx.initialize().await;
    assert_eq!(snap.state, SessionState::Unauthenticated);
    assert!(snap.last_error.is_some());
    assert!(store.has_token());
}
