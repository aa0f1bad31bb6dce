//! Single-frame parsing.
//!
//! A frame is the text between two blank lines. Only `data:` lines carry
//! payload; comments and other fields are skipped.

use super::events::{ChatEvent, SseParseError};

pub const DATA_PREFIX: &str = "data:";
pub const FRAME_DELIMITER: &str = "\n\n";

/// One line of an SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine<'a> {
    Empty,
    /// `: comment`
    Comment(&'a str),
    /// `data: payload` with the prefix and one optional space removed
    Data(&'a str),
    /// Any other `name: value` field (`event:`, `id:`, `retry:`)
    Field(&'a str),
}

/// Classify a single line. A trailing `\r` is ignored.
pub fn parse_sse_line(line: &str) -> SseLine<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(comment) = line.strip_prefix(':') {
        return SseLine::Comment(comment);
    }

    if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
        return SseLine::Data(rest.strip_prefix(' ').unwrap_or(rest));
    }

    SseLine::Field(line)
}

/// Parse one complete frame.
///
/// Returns `Ok(None)` when the frame has no data line. Multiple data lines
/// are joined with `\n` before JSON parsing.
pub fn parse_frame(frame: &str) -> Result<Option<ChatEvent>, SseParseError> {
    let mut payload: Option<String> = None;

    for line in frame.split('\n') {
        if let SseLine::Data(data) = parse_sse_line(line) {
            match payload.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(data);
                }
                None => payload = Some(data.to_string()),
            }
        }
    }

    let Some(payload) = payload else {
        return Ok(None);
    };

    serde_json::from_str(&payload)
        .map(Some)
        .map_err(|e| SseParseError::InvalidJson {
            payload,
            reason: e.to_string(),
        })
}
