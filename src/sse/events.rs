//! Chat progress events carried by the streaming chat endpoint.
//!
//! Each SSE frame holds one JSON object whose `type` field selects the
//! variant. Fields the backend omits fall back to their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Typed progress events from the multi-agent assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The orchestrator started analysing the question.
    Thinking {
        #[serde(default)]
        message: String,
    },
    /// The orchestrator picked the specialists to consult.
    Routing {
        #[serde(default)]
        message: String,
        #[serde(default)]
        specialists: Vec<String>,
    },
    /// A specialist sub-agent started working.
    SpecialistStart {
        #[serde(default)]
        message: String,
        #[serde(default)]
        specialist: String,
    },
    /// A specialist sub-agent finished.
    SpecialistComplete {
        #[serde(default)]
        message: String,
        #[serde(default)]
        specialist: String,
    },
    /// Specialist summaries are being merged into the answer.
    Synthesizing {
        #[serde(default)]
        message: String,
    },
    /// Final answer. `error` is set when the backend produced an apology
    /// instead of an answer.
    Complete {
        #[serde(default)]
        message: String,
        #[serde(default)]
        response: String,
        #[serde(default)]
        tools_used: Vec<String>,
        #[serde(default)]
        error: bool,
    },
    /// The backend failed while answering.
    Error {
        #[serde(default)]
        message: String,
    },
    /// A `type` this client does not know. Dropped by the decoder.
    #[serde(other)]
    Unknown,
}

impl ChatEvent {
    /// Returns the wire name of the event type.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            ChatEvent::Thinking { .. } => "thinking",
            ChatEvent::Routing { .. } => "routing",
            ChatEvent::SpecialistStart { .. } => "specialist_start",
            ChatEvent::SpecialistComplete { .. } => "specialist_complete",
            ChatEvent::Synthesizing { .. } => "synthesizing",
            ChatEvent::Complete { .. } => "complete",
            ChatEvent::Error { .. } => "error",
            ChatEvent::Unknown => "unknown",
        }
    }

    /// The human-readable progress message.
    pub fn message(&self) -> &str {
        match self {
            ChatEvent::Thinking { message }
            | ChatEvent::Routing { message, .. }
            | ChatEvent::SpecialistStart { message, .. }
            | ChatEvent::SpecialistComplete { message, .. }
            | ChatEvent::Synthesizing { message }
            | ChatEvent::Complete { message, .. }
            | ChatEvent::Error { message } => message,
            ChatEvent::Unknown => "",
        }
    }

    /// True for events after which the backend sends nothing else.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Complete { .. } | ChatEvent::Error { .. })
    }
}

/// Why a single frame could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SseParseError {
    /// The data payload is not valid JSON for a chat event.
    #[error("invalid JSON payload: {reason}")]
    InvalidJson { payload: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complete_with_defaults() {
        let event: ChatEvent =
            serde_json::from_str(r#"{"type":"complete","message":"Listo","response":"42"}"#)
                .unwrap();
        assert_eq!(
            event,
            ChatEvent::Complete {
                message: "Listo".to_string(),
                response: "42".to_string(),
                tools_used: vec![],
                error: false,
            }
        );
        assert!(event.is_terminal());
    }

    #[test]
    fn test_deserialize_routing() {
        let event: ChatEvent = serde_json::from_str(
            r#"{"type":"routing","message":"Consultando","specialists":["sql_specialist","search_specialist"]}"#,
        )
        .unwrap();
        match event {
            ChatEvent::Routing { specialists, .. } => {
                assert_eq!(specialists, vec!["sql_specialist", "search_specialist"]);
            }
            other => panic!("Expected Routing, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_unknown_type() {
        let event: ChatEvent =
            serde_json::from_str(r#"{"type":"heartbeat","message":"still here"}"#).unwrap();
        assert_eq!(event, ChatEvent::Unknown);
        assert_eq!(event.message(), "");
    }

    #[test]
    fn test_missing_type_is_an_error() {
        assert!(serde_json::from_str::<ChatEvent>(r#"{"message":"x"}"#).is_err());
    }

    #[test]
    fn test_serialize_uses_snake_case_tag() {
        let event = ChatEvent::SpecialistStart {
            message: "SQL".to_string(),
            specialist: "sql_specialist".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "specialist_start");
        assert_eq!(json["specialist"], "sql_specialist");
        assert_eq!(event.event_type_name(), "specialist_start");
    }

    #[test]
    fn test_parse_error_reports_reason_without_source() {
        use std::error::Error as _;

        let err = SseParseError::InvalidJson {
            payload: "{bad".to_string(),
            reason: "key must be a string at line 1 column 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid JSON payload: key must be a string at line 1 column 2"
        );
        assert!(err.source().is_none());
    }
}
