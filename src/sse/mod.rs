//! SSE (Server-Sent Events) decoding for the streaming chat endpoint.
//!
//! The backend sends one JSON object per frame:
//! - `data: <json>` - payload line (several are joined with `\n`)
//! - Empty line - ends the frame
//! - Lines starting with `:` and other fields - ignored
//!
//! # Module structure
//! - `events` - [`ChatEvent`] and [`SseParseError`]
//! - `utf8` - UTF-8 carry-over between chunks
//! - `frame` - single-frame parsing ([`parse_frame`])
//! - `decoder` - incremental [`FrameDecoder`] and [`DecodeStats`]
//! - `reader` - async [`EventReader`] with cancellation and idle timeout

mod decoder;
mod events;
mod frame;
mod reader;
mod utf8;

pub use decoder::{DecodeStats, FrameDecoder};
pub use events::{ChatEvent, SseParseError};
pub use frame::{parse_frame, parse_sse_line, SseLine, DATA_PREFIX, FRAME_DELIMITER};
pub use reader::{DecodeState, EventReader, StreamOutcome};
pub use utf8::Utf8Accumulator;
