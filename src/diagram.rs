//! Mermaid diagram support.
//!
//! Renderer settings are applied once per process: the first call to
//! [`initialize`] wins and later calls are ignored. Assistant answers embed
//! diagrams as ```` ```mermaid ```` fenced blocks, which
//! [`split_segments`] separates from the surrounding prose.

use std::str::FromStr;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static CONFIG: OnceCell<DiagramConfig> = OnceCell::new();

static MERMAID_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```mermaid[ \t]*\r?\n(.*?)```").expect("Invalid mermaid fence regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramTheme {
    #[default]
    Default,
    Dark,
    Forest,
    Neutral,
    Base,
}

impl FromStr for DiagramTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(DiagramTheme::Default),
            "dark" => Ok(DiagramTheme::Dark),
            "forest" => Ok(DiagramTheme::Forest),
            "neutral" => Ok(DiagramTheme::Neutral),
            "base" => Ok(DiagramTheme::Base),
            other => Err(format!(
                "unknown theme '{}', expected default, dark, forest, neutral or base",
                other
            )),
        }
    }
}

/// How much the renderer trusts diagram text (HTML labels, click handlers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    #[default]
    Strict,
    Loose,
    Antiscript,
    Sandbox,
}

/// Renderer settings, serialized in the renderer's own camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramConfig {
    pub theme: DiagramTheme,
    pub security_level: SecurityLevel,
    /// Render every diagram on page load instead of on demand
    pub start_on_load: bool,
    pub font_family: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            theme: DiagramTheme::Default,
            security_level: SecurityLevel::Strict,
            start_on_load: false,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl DiagramConfig {
    pub fn with_theme(mut self, theme: DiagramTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = level;
        self
    }

    pub fn with_start_on_load(mut self, start: bool) -> Self {
        self.start_on_load = start;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }
}

/// Apply renderer settings. Returns `false` if settings were already applied.
pub fn initialize(config: DiagramConfig) -> bool {
    match CONFIG.set(config) {
        Ok(()) => true,
        Err(_) => {
            debug!("Diagram renderer already initialized, ignoring new settings");
            false
        }
    }
}

/// Active settings, applying the defaults if nothing was initialized yet.
pub fn config() -> &'static DiagramConfig {
    CONFIG.get_or_init(DiagramConfig::default)
}

pub fn is_initialized() -> bool {
    CONFIG.get().is_some()
}

/// `%%{init: ...}%%` line carrying the active settings.
pub fn init_directive() -> String {
    let settings = serde_json::to_string(config()).unwrap_or_else(|_| "{}".to_string());
    format!("%%{{init: {}}}%%", settings)
}

/// Prefix a diagram source with the init directive so any renderer
/// reproduces the configured look.
pub fn with_init_directive(source: &str) -> String {
    format!("{}\n{}", init_directive(), source)
}

/// A piece of an assistant answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// Mermaid source with the fence removed
    Diagram(&'a str),
}

/// Split `text` into prose and diagram segments in their original order.
///
/// Whitespace-only prose between blocks is dropped. An unterminated fence
/// stays part of the prose.
pub fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for captures in MERMAID_FENCE.captures_iter(text) {
        let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        push_text(&mut segments, &text[last..whole.start()]);
        segments.push(Segment::Diagram(body.as_str().trim()));
        last = whole.end();
    }
    push_text(&mut segments, &text[last..]);

    segments
}

/// Mermaid sources of every fenced block in `text`.
pub fn extract_diagrams(text: &str) -> Vec<&str> {
    split_segments(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Diagram(source) => Some(source),
            Segment::Text(_) => None,
        })
        .collect()
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.trim().is_empty() {
        segments.push(Segment::Text(text));
    }
}
