//! Request client for the archive backend.
//!
//! [`RequestClient`] is a single-shot GET primitive against one configured
//! base endpoint. It never retries; every failure is normalized into an
//! [`ErrorInfo`]. Controllers depend on the [`ApiTransport`] trait rather
//! than on the concrete client so tests can script responses with
//! [`MockTransport`].

pub mod api;
mod error;
pub mod mock;

pub use error::{ErrorCategory, ErrorInfo};
pub use mock::MockTransport;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiConfig;

/// Default request timeout; a silent backend fails instead of hanging.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A transport able to issue a GET and decode a JSON body.
#[async_trait]
pub trait ApiTransport: Send + Sync + std::fmt::Debug {
    /// Issue `GET path?params` and return the decoded JSON body.
    ///
    /// Parameters are sent in the given order, each name and value
    /// percent-encoded.
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ErrorInfo>;
}

/// Build `path?name=value&...` with every name and value percent-encoded.
pub fn request_target(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query = params
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", path, query)
}

/// Settings for one [`RequestClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base endpoint; paths are appended to it verbatim
    pub base_url: String,

    /// Whole-request timeout
    pub timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a config for the given base endpoint with default timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Config for the main archive endpoint
    pub fn from_api(api: &ApiConfig) -> Self {
        Self::with_base(api, &api.base_url)
    }

    /// Config for the summarization endpoint, falling back to the archive
    /// endpoint when no separate one is configured
    pub fn summarization(api: &ApiConfig) -> Self {
        Self::with_base(api, api.summarize_base_url())
    }

    fn with_base(api: &ApiConfig, base_url: &str) -> Self {
        let mut config = Self::new(base_url)
            .timeout(Duration::from_secs(api.timeout_secs))
            .connect_timeout(Duration::from_secs(api.connect_timeout_secs));
        if let Some(ref agent) = api.user_agent {
            config = config.user_agent(agent.clone());
        }
        config
    }
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Errors raised while constructing a [`RequestClient`]
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// The base endpoint is not an absolute http(s) URL
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP implementation of [`ApiTransport`].
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct RequestClient {
    client: Arc<Client>,
    base_url: String,
}

impl RequestClient {
    /// Build a client for the configured endpoint
    pub fn new(config: ClientConfig) -> Result<Self, ClientBuildError> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|_| ClientBuildError::InvalidBaseUrl(config.base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientBuildError::InvalidBaseUrl(config.base_url));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base endpoint, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a path and parameter list
    pub fn url_for(&self, path: &str, params: &[(&str, &str)]) -> String {
        format!("{}{}", self.base_url, request_target(path, params))
    }
}

#[async_trait]
impl ApiTransport for RequestClient {
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ErrorInfo> {
        let url = self.url_for(path, params);
        tracing::debug!(%url, "GET");

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, timeout = e.is_timeout(), "request failed");
            ErrorInfo::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "non-success status");
            return Err(ErrorInfo::HttpStatusFailure(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "failed to read response body");
            ErrorInfo::from(e)
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(%url, error = %e, "response body is not valid JSON");
            ErrorInfo::from(e)
        })
    }
}
