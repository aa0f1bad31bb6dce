//! Client configuration.
//!
//! Defaults target the dashboard's local proxy. Environment variables
//! override the defaults; command-line flags override both.

use std::time::Duration;

use crate::error::{BrainError, BrainResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Matches the stream timeout the dashboard's own scripts use.
pub const DEFAULT_STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

pub const ENV_API_URL: &str = "BRAIN_API_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "BRAIN_REQUEST_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT: &str = "BRAIN_CONNECT_TIMEOUT_SECS";
pub const ENV_STREAM_IDLE_TIMEOUT: &str = "BRAIN_STREAM_IDLE_TIMEOUT_SECS";

/// Configuration for [`BrainClient`](crate::client::BrainClient).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use brain::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("http://dashboard.local/api")
///     .with_request_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url, "http://dashboard.local/api");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    /// Whole-request limit for buffered calls
    pub request_timeout: Duration,
    /// TCP/TLS connect limit for every call
    pub connect_timeout: Duration,
    /// Longest silence tolerated between chunks of a chat stream
    pub stream_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            stream_idle_timeout: DEFAULT_STREAM_IDLE_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API root. A trailing slash is removed.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(url.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    /// Defaults overridden by `BRAIN_*` environment variables.
    ///
    /// Only malformed numbers fail here. Call [`validate`](Self::validate)
    /// once every override has been applied.
    pub fn from_env() -> BrainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> BrainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(timeout) = parse_secs(&lookup, ENV_REQUEST_TIMEOUT)? {
            config.request_timeout = timeout;
        }
        if let Some(timeout) = parse_secs(&lookup, ENV_CONNECT_TIMEOUT)? {
            config.connect_timeout = timeout;
        }
        if let Some(timeout) = parse_secs(&lookup, ENV_STREAM_IDLE_TIMEOUT)? {
            config.stream_idle_timeout = timeout;
        }

        Ok(config)
    }

    /// Reject configurations no request could succeed with.
    pub fn validate(&self) -> BrainResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(BrainError::config(
                "base_url",
                format!("expected an http(s) URL, got '{}'", self.base_url),
            ));
        }
        for (key, value) in [
            ("request_timeout", self.request_timeout),
            ("connect_timeout", self.connect_timeout),
            ("stream_idle_timeout", self.stream_idle_timeout),
        ] {
            if value.is_zero() {
                return Err(BrainError::config(key, "must be greater than zero"));
            }
        }
        Ok(())
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn parse_secs<F>(lookup: &F, key: &str) -> BrainResult<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| BrainError::config(key, format!("expected whole seconds, got '{}'", raw)))
}
