//! Network-related error types.
//!
//! Errors raised while talking to the Brain API over HTTP, before any
//! stream decoding starts.

use std::fmt;

use crate::traits::HttpError;

/// Message shown to the user for any transport failure.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the Brain service. Please check your connection and try again.";

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    Timeout { url: String, message: String },

    /// Non-2xx response. `message` carries the FastAPI `detail` when present.
    HttpStatus { status: u16, message: String },

    /// Response body could not be decoded into the expected model.
    InvalidResponse { message: String },

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::HttpStatus { status, message } => match *status {
                400 | 422 => format!("The request was rejected: {}", message),
                404 => "The requested resource was not found.".to_string(),
                503 => "The AI assistant is not available right now. Please try again later."
                    .to_string(),
                _ => CONNECTIVITY_MESSAGE.to_string(),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an unexpected response from the server.".to_string()
            }
            _ => CONNECTIVITY_MESSAGE.to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { url, message } => {
                write!(f, "Request to '{}' timed out: {}", url, message)
            }
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Classify an [`HttpError`] from the transport seam into a [`NetworkError`].
pub fn classify_http_error(err: HttpError, url: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message,
        },
        HttpError::Timeout(message) => NetworkError::Timeout {
            url: url.to_string(),
            message,
        },
        HttpError::ServerError { status, message } => NetworkError::HttpStatus {
            status,
            message: fastapi_detail(&message),
        },
        HttpError::InvalidUrl(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: format!("invalid URL: {}", message),
        },
        HttpError::Io(message) | HttpError::Other(message) => NetworkError::Other { message },
    }
}

/// Extract `detail` from a FastAPI error body, falling back to the raw body.
pub fn fastapi_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.trim().to_string())
}
