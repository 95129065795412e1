//! Network seam for the coordinator.
//!
//! ### Network trait
//! - The coordinator only talks to the network through [`Network`], so tests
//!   can script latency, failures and offline periods.
//! - Transport failures (offline, DNS, abort, timeout) are errors; any HTTP
//!   status, including 4xx/5xx, is a response.
//!
//! ### HTTP implementation
//! - [`HttpNetwork`] wraps a reqwest client with a user agent, overall
//!   timeout, redirect limit and a max body size.

pub mod message;
pub mod url;

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

pub use message::{Request, RequestMode, Response, ResponseSource};
pub use self::url::{UrlError, canonicalize, resolve};

use smartnav_core::{AppConfig, Error};

/// Transport-level failure; never an HTTP status.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("response too large: {len} bytes exceeds {max}")]
    TooLarge { len: usize, max: usize },

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            NetworkError::Body(err.to_string())
        } else {
            NetworkError::Other(err.to_string())
        }
    }
}

/// Anything that can turn a [`Request`] into a network [`Response`].
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "smartnav/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10MB)
    pub max_bytes: usize,

    /// Overall request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "smartnav/0.1".to_string(),
            max_bytes: 10 * 1024 * 1024,
            timeout: Duration::from_millis(20_000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// reqwest-backed [`Network`].
pub struct HttpNetwork {
    http: Client,
    config: FetchConfig,
}

impl HttpNetwork {
    /// Create a new HTTP network with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.as_str())
            .headers(request.headers.clone())
            .send()
            .await?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(NetworkError::TooLarge { len: len as usize, max: self.config.max_bytes });
        }

        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if bytes.len() > self.config.max_bytes {
            return Err(NetworkError::TooLarge { len: bytes.len(), max: self.config.max_bytes });
        }

        tracing::debug!(
            url = %request.url,
            status = status.as_u16(),
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "network fetch complete"
        );

        Ok(Response::new(request.url.clone(), status, headers, bytes))
    }
}
