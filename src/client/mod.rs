//! Backend REST client.
//!
//! One thin `ApiClient` wraps reqwest with the plant backend's conventions:
//! bearer Authorization on every request, JSON bodies, and FastAPI-style
//! `{"detail": ...}` error payloads decoded into
//! [`EngineError::Server`](crate::types::EngineError). Endpoint groups live
//! in submodules:
//!
//! - [`reports`]: unit/station daily reports
//! - [`dm`]: DM plant sections, chemistry/coal modules, aggregate report
//! - [`fuel`]: fuel ledger with derived opening/closing stock
//! - [`admin`]: KPI config/offsets, totalizer reset, session capabilities

pub mod admin;
pub mod dm;
pub mod fuel;
pub mod reports;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::types::{EngineError, Result};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the reporting backend, without a trailing slash.
    pub base_url: String,
    /// Opaque bearer token. The client attaches it; the backend enforces it.
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            auth_token: None,
            request_timeout: Duration::from_millis(30_000),
        }
    }
}

pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client. Fails when the underlying HTTP client cannot be
    /// constructed; a fallback client would drop the configured timeout.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent("stoker/0.1")
            .build()
            .map_err(|e| EngineError::Config(format!("http client: {e}")))?;

        Ok(Self { config, http })
    }

    pub fn with_defaults(base_url: &str) -> Result<Self> {
        Self::new(ApiConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// GET, expecting a JSON body. 404 is an error here; endpoints where
    /// absence is normal go through [`get_optional`](Self::get_optional).
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .authorize(self.http.get(self.url(path)).query(query))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// GET where a 404 means "no such record" rather than failure.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let response = self
            .authorize(self.http.get(self.url(path)).query(query))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(path, "no record (404)");
            return Ok(None);
        }
        Self::decode(response).await.map(Some)
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T> {
        let response = self
            .authorize(self.http.post(self.url(path)).json(body))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let response = self.authorize(self.http.delete(self.url(path))).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::server_error(response).await)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| EngineError::Decode(e.to_string()))
    }

    /// Map a non-success response to `Server{status, detail}`, pulling the
    /// backend's own message out of `{"detail": ...}` when present.
    async fn server_error(response: reqwest::Response) -> EngineError {
        let status = response.status().as_u16();
        let detail = match response.text().await {
            Ok(body) => extract_detail(&body),
            Err(_) => None,
        };
        EngineError::Server {
            status,
            detail: detail.unwrap_or_else(|| "request rejected".to_string()),
        }
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
        None => None,
    }
}
