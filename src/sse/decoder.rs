//! Incremental frame decoder.
//!
//! Bytes go in as they arrive; complete frames come out as events in stream
//! order. Anything after the last frame delimiter stays buffered until more
//! bytes arrive or the stream ends.

use tracing::{debug, warn};

use super::events::ChatEvent;
use super::frame::{parse_frame, FRAME_DELIMITER};
use super::utf8::Utf8Accumulator;

/// Counters describing what a decode operation saw and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Complete frames split out of the stream.
    pub frames: u64,
    /// Events handed to the caller.
    pub events: u64,
    /// Frames dropped because their payload was not a valid event.
    pub malformed: u64,
    /// Frames without a data line or with an unknown event type.
    pub ignored: u64,
    /// Bytes left over at stream end that never formed a frame.
    pub discarded_bytes: u64,
}

impl DecodeStats {
    /// True when nothing was dropped except frames the protocol allows
    /// clients to skip.
    pub fn is_lossless(&self) -> bool {
        self.malformed == 0 && self.discarded_bytes == 0
    }
}

#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Accumulator,
    buffer: String,
    /// Byte offset in `buffer` already searched for a delimiter.
    scanned: usize,
    stats: DecodeStats,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return the events completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChatEvent> {
        self.utf8.decode(bytes, &mut self.buffer);
        self.drain_frames()
    }

    /// Feed already-decoded text.
    ///
    /// Must not be mixed with [`feed`](Self::feed) while a multi-byte
    /// character is still pending.
    pub fn feed_str(&mut self, text: &str) -> Vec<ChatEvent> {
        self.buffer.push_str(text);
        self.drain_frames()
    }

    /// Close the decode operation, discarding any incomplete trailing frame.
    pub fn finish(&mut self) -> DecodeStats {
        let leftover = self.buffer.len() + self.utf8.discard();
        if leftover > 0 {
            debug!(bytes = leftover, "Discarding incomplete SSE frame at stream end");
            self.stats.discarded_bytes += leftover as u64;
        }
        self.buffer.clear();
        self.scanned = 0;
        self.stats
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Bytes buffered but not yet part of a complete frame.
    pub fn pending_len(&self) -> usize {
        self.buffer.len() + self.utf8.pending_len()
    }

    fn drain_frames(&mut self) -> Vec<ChatEvent> {
        let delimiter = FRAME_DELIMITER.as_bytes();
        let mut events = Vec::new();
        let mut start = 0;
        // Back up one byte so a delimiter split across feeds is still found
        let mut search_from = self.scanned.saturating_sub(delimiter.len() - 1);

        while let Some(pos) = self.buffer.as_bytes()[search_from..]
            .windows(delimiter.len())
            .position(|window| window == delimiter)
        {
            let end = search_from + pos;
            let frame = &self.buffer[start..end];
            if let Some(event) = decode_frame(frame, &mut self.stats) {
                events.push(event);
            }
            start = end + delimiter.len();
            search_from = start;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
        self.scanned = self.buffer.len();
        events
    }
}

fn decode_frame(frame: &str, stats: &mut DecodeStats) -> Option<ChatEvent> {
    stats.frames += 1;
    match parse_frame(frame) {
        Ok(Some(ChatEvent::Unknown)) => {
            debug!("Ignoring SSE frame with unknown event type");
            stats.ignored += 1;
            None
        }
        Ok(Some(event)) => {
            stats.events += 1;
            Some(event)
        }
        Ok(None) => {
            debug!("Ignoring SSE frame without data");
            stats.ignored += 1;
            None
        }
        Err(e) => {
            warn!(error = %e, "Dropping malformed SSE frame");
            stats.malformed += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THINKING: &str = "data: {\"type\":\"thinking\",\"message\":\"Analizando\"}\n\n";
    const COMPLETE: &str =
        "data: {\"type\":\"complete\",\"message\":\"Listo\",\"response\":\"42\"}\n\n";

    fn expected() -> Vec<ChatEvent> {
        vec![
            ChatEvent::Thinking {
                message: "Analizando".to_string(),
            },
            ChatEvent::Complete {
                message: "Listo".to_string(),
                response: "42".to_string(),
                tools_used: vec![],
                error: false,
            },
        ]
    }

    fn decode_in_chunks(input: &[u8], size: usize) -> (Vec<ChatEvent>, DecodeStats) {
        let mut decoder = FrameDecoder::new();
        let mut events = Vec::new();
        for chunk in input.chunks(size) {
            events.extend(decoder.feed(chunk));
        }
        let stats = decoder.finish();
        (events, stats)
    }

    #[test]
    fn test_two_frames_in_one_chunk() {
        let input = format!("{}{}", THINKING, COMPLETE);
        let (events, stats) = decode_in_chunks(input.as_bytes(), input.len());
        assert_eq!(events, expected());
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.events, 2);
        assert!(stats.is_lossless());
    }

    #[test]
    fn test_chunking_invariance() {
        let input = format!("{}{}{}", THINKING, ": ping\n\n", COMPLETE);
        let whole = decode_in_chunks(input.as_bytes(), input.len()).0;
        for size in [1, 2, 3, 7, 16, THINKING.len()] {
            let (events, _) = decode_in_chunks(input.as_bytes(), size);
            assert_eq!(events, whole, "chunk size {}", size);
        }
        assert_eq!(whole, expected());
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        let (head, tail) = THINKING.split_at(THINKING.len() - 1);

        assert!(decoder.feed(head.as_bytes()).is_empty());
        let events = decoder.feed(tail.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(decoder.pending_len(), 0);
        assert_eq!(decoder.stats().frames, 1);
    }

    #[test]
    fn test_trailing_incomplete_frame_is_discarded() {
        let partial = "data: {\"type\":\"synthesizing\"}\n";
        let input = format!("{}{}", THINKING, partial);
        let (events, stats) = decode_in_chunks(input.as_bytes(), 5);

        assert_eq!(events.len(), 1);
        assert_eq!(stats.discarded_bytes, partial.len() as u64);
        assert!(!stats.is_lossless());
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let input = "data: {\"type\":\"synthesizing\",\"message\":\"Combinando información 🔗\"}\n\n";
        let bytes = input.as_bytes();
        let split = input.find('ó').unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&bytes[..split]).is_empty());
        let events = decoder.feed(&bytes[split..]);
        assert_eq!(
            events,
            vec![ChatEvent::Synthesizing {
                message: "Combinando información 🔗".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_frame_is_skipped() {
        let input = format!("{}data: {{broken\n\n{}", THINKING, COMPLETE);
        let (events, stats) = decode_in_chunks(input.as_bytes(), 4);

        assert_eq!(events, expected());
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.malformed, 1);
    }

    #[test]
    fn test_unknown_and_dataless_frames_are_ignored() {
        let input = format!(
            "{}event: keepalive\n\ndata: {{\"type\":\"heartbeat\"}}\n\n{}",
            THINKING, COMPLETE
        );
        let (events, stats) = decode_in_chunks(input.as_bytes(), input.len());

        assert_eq!(events, expected());
        assert_eq!(stats.ignored, 2);
        assert_eq!(stats.malformed, 0);
    }

    #[test]
    fn test_feed_str() {
        let mut decoder = FrameDecoder::new();
        let mut events = decoder.feed_str(&THINKING[..10]);
        events.extend(decoder.feed_str(&THINKING[10..]));
        events.extend(decoder.feed_str(COMPLETE));
        assert_eq!(events, expected());
    }

    #[test]
    fn test_finish_with_clean_end() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(THINKING.as_bytes());
        let stats = decoder.finish();
        assert_eq!(stats.discarded_bytes, 0);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_byte_at_a_time_with_malformed_and_trailing_frames() {
        let trailing = "data: {\"type\":\"thin";
        let input = format!(
            "data: {{\"type\":\"thinking\",\"message\":\"Analizando ñ🎯\"}}\n\ndata: {{bad\n\n{}{}",
            COMPLETE, trailing
        );
        let (events, stats) = decode_in_chunks(input.as_bytes(), 1);

        assert_eq!(
            events,
            vec![
                ChatEvent::Thinking {
                    message: "Analizando ñ🎯".to_string()
                },
                expected()[1].clone(),
            ]
        );
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.events, 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.discarded_bytes, trailing.len() as u64);
    }
}
