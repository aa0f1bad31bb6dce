//! Chat progress tracking.
//!
//! Folds the event sequence of one streamed answer into what a chat view
//! shows: the current status line, which specialists were consulted and
//! which have finished, and finally the answer or the failure.

use crate::sse::ChatEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    #[default]
    Waiting,
    Thinking,
    Routing,
    Consulting,
    Synthesizing,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatProgress {
    pub phase: ChatPhase,
    /// Latest progress message
    pub status: String,
    /// Specialists the orchestrator routed to, in routing order
    pub specialists: Vec<String>,
    /// Specialists that reported completion, in completion order
    pub completed: Vec<String>,
    pub tools_used: Vec<String>,
    pub response: Option<String>,
    pub error: Option<String>,
    /// Events applied so far
    pub events_seen: usize,
}

impl ChatProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &ChatEvent) {
        self.events_seen += 1;
        if !event.message().is_empty() {
            self.status = event.message().to_string();
        }

        match event {
            ChatEvent::Thinking { .. } => self.phase = ChatPhase::Thinking,
            ChatEvent::Routing { specialists, .. } => {
                self.phase = ChatPhase::Routing;
                for specialist in specialists {
                    push_unique(&mut self.specialists, specialist);
                }
            }
            ChatEvent::SpecialistStart { specialist, .. } => {
                self.phase = ChatPhase::Consulting;
                push_unique(&mut self.specialists, specialist);
            }
            ChatEvent::SpecialistComplete { specialist, .. } => {
                self.phase = ChatPhase::Consulting;
                push_unique(&mut self.completed, specialist);
            }
            ChatEvent::Synthesizing { .. } => self.phase = ChatPhase::Synthesizing,
            ChatEvent::Complete {
                message,
                response,
                tools_used,
                error,
            } => {
                self.tools_used = tools_used.clone();
                self.response = Some(response.clone());
                if *error {
                    self.phase = ChatPhase::Failed;
                    self.error = Some(message.clone());
                } else {
                    self.phase = ChatPhase::Complete;
                }
            }
            ChatEvent::Error { message } => {
                self.phase = ChatPhase::Failed;
                self.error = Some(message.clone());
            }
            ChatEvent::Unknown => {}
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, ChatPhase::Complete | ChatPhase::Failed)
    }

    pub fn is_failed(&self) -> bool {
        self.phase == ChatPhase::Failed
    }

    /// Specialists routed to that have not reported completion.
    pub fn pending_specialists(&self) -> Vec<&str> {
        self.specialists
            .iter()
            .filter(|s| !self.completed.contains(s))
            .map(String::as_str)
            .collect()
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}
