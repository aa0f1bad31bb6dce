//! Streaming-related error types.
//!
//! Fatal failures of an SSE chat stream once the response has started.
//! Malformed frames are not represented here: the decoder drops them.

use std::fmt;
use std::time::Duration;

use super::network::CONNECTIVITY_MESSAGE;
use crate::traits::HttpError;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Reading the next chunk failed.
    ConnectionLost { message: String },

    /// No chunk arrived within the idle window.
    Timeout { idle: Duration },

    /// Generic stream error.
    Other { message: String },
}

impl StreamError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::ConnectionLost { .. } | StreamError::Timeout { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Timeout { idle } => format!(
                "No response from the assistant for {:?}. Please try again.",
                idle
            ),
            _ => CONNECTIVITY_MESSAGE.to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::Timeout { .. } => "E_STREAM_TIMEOUT",
            StreamError::Other { .. } => "E_STREAM_OTHER",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
            StreamError::Timeout { idle } => write!(f, "Stream idle for {:?}", idle),
            StreamError::Other { message } => write!(f, "Stream error: {}", message),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout(message)
            | HttpError::Io(message)
            | HttpError::ConnectionFailed(message) => StreamError::ConnectionLost { message },
            other => StreamError::Other {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_lost_is_retryable() {
        let err = StreamError::ConnectionLost {
            message: "socket closed".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "E_STREAM_CONN");
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
    }

    #[test]
    fn test_timeout_message_mentions_duration() {
        let err = StreamError::Timeout {
            idle: Duration::from_secs(120),
        };
        assert!(err.is_retryable());
        assert!(err.user_message().contains("for 120s."));
    }

    #[test]
    fn test_sub_second_timeout_keeps_precision() {
        let err = StreamError::Timeout {
            idle: Duration::from_millis(250),
        };
        assert!(err.user_message().contains("for 250ms."));
        assert_eq!(err.to_string(), "Stream idle for 250ms");
    }

    #[test]
    fn test_from_http_io_error() {
        let err: StreamError = HttpError::Io("connection reset".to_string()).into();
        assert_eq!(
            err,
            StreamError::ConnectionLost {
                message: "connection reset".to_string()
            }
        );
    }
}
