use serde::{Deserialize, Serialize};

use crate::diagram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message of prior conversation sent as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /ai/chat` and `POST /ai/chat/stream`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            chat_history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.chat_history = history;
        self
    }
}

/// Response of `POST /ai/chat` and `POST /ai/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Tool identifiers the assistant used
    #[serde(default)]
    pub tool_calls: Vec<String>,
    #[serde(default)]
    pub intermediate_steps: Vec<serde_json::Value>,
}

impl ChatResponse {
    /// Mermaid sources embedded in the answer.
    pub fn diagrams(&self) -> Vec<&str> {
        diagram::extract_diagrams(&self.response)
    }
}

pub type AnalysisResponse = ChatResponse;

/// Body of `POST /ai/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub query: String,
}

/// Body of `POST /ai/visualize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizeRequest {
    pub description: String,
}

/// Response of `POST /ai/visualize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramResponse {
    /// Assistant answer, usually a fenced mermaid block
    pub mermaid_code: String,
    pub description: String,
}

impl DiagramResponse {
    /// Diagram source without the fence. Falls back to the whole text when
    /// the answer has no fenced block.
    pub fn diagram_source(&self) -> &str {
        diagram::extract_diagrams(&self.mermaid_code)
            .into_iter()
            .next()
            .unwrap_or_else(|| self.mermaid_code.trim())
    }
}

/// Running chat history, updated after each completed exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request for `message` carrying everything said so far.
    pub fn request(&self, message: impl Into<String>) -> ChatRequest {
        ChatRequest::new(message).with_history(self.turns.clone())
    }

    /// Record a question and the assistant's answer.
    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(ChatTurn::user(question));
        self.turns.push(ChatTurn::assistant(answer));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
