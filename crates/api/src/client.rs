//! The one HTTP client every call goes through.

use std::sync::Arc;

use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use liftlog_auth::CredentialStore;

use crate::middleware::{BearerAuth, RequestStage};
use crate::resources::{AuthApi, ExercisesApi, UsersApi, WorkoutsApi};
use crate::{ApiConfig, ApiError};

/// Gateway to the remote service.
///
/// Cheap to clone; clones share the connection pool and the stage list.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    stages: Arc<[Arc<dyn RequestStage>]>,
}

pub struct ApiClientBuilder {
    config: ApiConfig,
    stages: Vec<Arc<dyn RequestStage>>,
}

impl ApiClientBuilder {
    /// Append a stage. Stages run in registration order.
    pub fn stage(mut self, stage: impl RequestStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Shorthand for `.stage(BearerAuth::new(store))`.
    pub fn bearer_auth(self, store: Arc<dyn CredentialStore>) -> Self {
        self.stage(BearerAuth::new(store))
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base = self.config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(self.config.user_agent.clone())
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(ApiClient {
            http,
            base_url: base,
            stages: self.stages.into(),
        })
    }
}

impl ApiClient {
    pub fn builder(config: ApiConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            stages: Vec::new(),
        }
    }

    /// Client with the bearer stage wired to `store`.
    pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        Self::builder(config).bearer_auth(store).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn workouts(&self) -> WorkoutsApi<'_> {
        WorkoutsApi::new(self)
    }

    pub fn exercises(&self) -> ExercisesApi<'_> {
        ExercisesApi::new(self)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// `DELETE`, discarding whatever body comes back.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let response = self.execute(method, path, body).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path)?;

        let mut builder = self.http.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder.build()?;

        for stage in self.stages.iter() {
            stage.apply(&mut request);
        }

        tracing::debug!(
            %method,
            path,
            authenticated = request.headers().contains_key(reqwest::header::AUTHORIZATION),
            "api request"
        );

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::debug!(%method, path, error = %e, "api transport failure");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        tracing::debug!(
            %method,
            path,
            status = status.as_u16(),
            error = %err,
            "api request rejected"
        );
        Err(err)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }
}

/// Escape `raw` so it stays a single path segment once joined to the base.
///
/// Everything outside the unreserved set is percent-encoded, `/` `?` `#` `%`
/// included. Empty, `.` and `..` are rejected since URL parsing would collapse
/// them.
pub(crate) fn path_segment(raw: &str) -> Result<String, ApiError> {
    if matches!(raw, "" | "." | "..") {
        return Err(ApiError::InvalidUrl(format!("`{raw}` is not a usable path segment")));
    }

    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    Ok(out)
}
