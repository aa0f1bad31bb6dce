//! Unified error type for the Brain client.

use std::fmt;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::stream::StreamError;

/// Type alias for Results using [`BrainError`].
pub type BrainResult<T> = Result<T, BrainError>;

/// Unified error type for the Brain client.
#[derive(Debug)]
pub enum BrainError {
    /// HTTP request/response errors.
    Network(NetworkError),

    /// Failures of a chat stream after it started.
    Stream(StreamError),

    /// Invalid caller input, such as inverted filter ranges.
    InvalidInput { field: String, message: String },

    /// Invalid configuration value.
    Config { key: String, message: String },
}

impl BrainError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        BrainError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        BrainError::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            BrainError::Network(NetworkError::HttpStatus { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            BrainError::Network(NetworkError::HttpStatus { .. }) => ErrorCategory::User,
            BrainError::Network(NetworkError::InvalidResponse { .. }) => ErrorCategory::Client,
            BrainError::Network(_) => ErrorCategory::Network,
            BrainError::Stream(_) => ErrorCategory::Network,
            BrainError::InvalidInput { .. } => ErrorCategory::User,
            BrainError::Config { .. } => ErrorCategory::Configuration,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            BrainError::Network(err) => err.is_retryable(),
            BrainError::Stream(err) => err.is_retryable(),
            BrainError::InvalidInput { .. } | BrainError::Config { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            BrainError::Network(err) => err.user_message(),
            BrainError::Stream(err) => err.user_message(),
            BrainError::InvalidInput { field, message } => {
                format!("Invalid value for {}: {}", field, message)
            }
            BrainError::Config { key, message } => {
                format!("Invalid configuration {}: {}", key, message)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            BrainError::Network(err) => err.error_code(),
            BrainError::Stream(err) => err.error_code(),
            BrainError::InvalidInput { .. } => "E_INPUT",
            BrainError::Config { .. } => "E_CONFIG",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for BrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrainError::Network(err) => write!(f, "{}", err),
            BrainError::Stream(err) => write!(f, "{}", err),
            BrainError::InvalidInput { field, message } => {
                write!(f, "Invalid {}: {}", field, message)
            }
            BrainError::Config { key, message } => write!(f, "Invalid config {}: {}", key, message),
        }
    }
}

impl std::error::Error for BrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrainError::Network(err) => Some(err),
            BrainError::Stream(err) => Some(err),
            BrainError::InvalidInput { .. } | BrainError::Config { .. } => None,
        }
    }
}

impl From<NetworkError> for BrainError {
    fn from(err: NetworkError) -> Self {
        BrainError::Network(err)
    }
}

impl From<StreamError> for BrainError {
    fn from(err: StreamError) -> Self {
        BrainError::Stream(err)
    }
}

impl From<serde_json::Error> for BrainError {
    fn from(err: serde_json::Error) -> Self {
        BrainError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}
