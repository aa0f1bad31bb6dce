//! Async event reader over a live byte stream.
//!
//! Reads chunks one at a time, racing each read against an optional
//! cancellation token and idle timer, and hands out decoded events in
//! stream order. The byte stream is dropped as soon as the reader stops
//! reading, whichever way it stops.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::decoder::{DecodeStats, FrameDecoder};
use super::events::ChatEvent;
use crate::error::StreamError;
use crate::traits::{ByteStream, HttpError};

/// Lifecycle of one decode operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Nothing read yet.
    Idle,
    /// Waiting for the next chunk.
    Reading,
    /// Handing a decoded event to the caller.
    EmittingEvent,
    /// The byte stream ended.
    Drained,
    /// Leftovers discarded, byte stream released.
    Closed,
    Cancelled,
    Failed,
}

impl DecodeState {
    /// True once no further events can be produced.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            DecodeState::Closed | DecodeState::Cancelled | DecodeState::Failed
        )
    }
}

/// How a successful decode operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The server closed the stream.
    Completed(DecodeStats),
    /// The caller cancelled before the stream ended.
    Cancelled(DecodeStats),
}

impl StreamOutcome {
    pub fn stats(&self) -> DecodeStats {
        match self {
            StreamOutcome::Completed(stats) | StreamOutcome::Cancelled(stats) => *stats,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamOutcome::Cancelled(_))
    }
}

enum Read {
    Chunk(Bytes),
    End,
    Cancelled,
    Failed(StreamError),
}

impl From<Option<Result<Bytes, HttpError>>> for Read {
    fn from(item: Option<Result<Bytes, HttpError>>) -> Self {
        match item {
            Some(Ok(bytes)) => Read::Chunk(bytes),
            Some(Err(err)) => Read::Failed(StreamError::from(err)),
            None => Read::End,
        }
    }
}

/// Reads [`ChatEvent`]s from an SSE byte stream.
pub struct EventReader {
    stream: Option<ByteStream>,
    decoder: FrameDecoder,
    ready: VecDeque<ChatEvent>,
    state: DecodeState,
    cancel: Option<CancellationToken>,
    idle_timeout: Option<Duration>,
}

impl EventReader {
    pub fn new(stream: ByteStream) -> Self {
        Self {
            stream: Some(stream),
            decoder: FrameDecoder::new(),
            ready: VecDeque::new(),
            state: DecodeState::Idle,
            cancel: None,
            idle_timeout: None,
        }
    }

    /// Stop reading once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fail with [`StreamError::Timeout`] when no chunk arrives within `duration`.
    pub fn with_idle_timeout(mut self, duration: Duration) -> Self {
        self.idle_timeout = Some(duration);
        self
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    pub fn stats(&self) -> DecodeStats {
        self.decoder.stats()
    }

    /// Next event in stream order.
    ///
    /// Returns `Ok(None)` when the stream has ended or the reader was
    /// cancelled; check [`state`](Self::state) to tell them apart.
    pub async fn next_event(&mut self) -> Result<Option<ChatEvent>, StreamError> {
        loop {
            if self.cancel_requested() {
                self.stop_cancelled();
                return Ok(None);
            }

            if let Some(event) = self.ready.pop_front() {
                self.set_state(DecodeState::EmittingEvent);
                return Ok(Some(event));
            }

            let Some(stream) = self.stream.as_mut() else {
                return Ok(None);
            };

            self.state = DecodeState::Reading;
            match read_next(stream, self.cancel.as_ref(), self.idle_timeout).await {
                Read::Chunk(bytes) => {
                    let events = self.decoder.feed(&bytes);
                    self.ready.extend(events);
                }
                Read::End => {
                    self.set_state(DecodeState::Drained);
                    self.stream = None;
                    let stats = self.decoder.finish();
                    debug!(
                        frames = stats.frames,
                        events = stats.events,
                        malformed = stats.malformed,
                        ignored = stats.ignored,
                        discarded_bytes = stats.discarded_bytes,
                        "SSE stream closed"
                    );
                    self.set_state(DecodeState::Closed);
                    return Ok(None);
                }
                Read::Cancelled => {
                    self.stop_cancelled();
                    return Ok(None);
                }
                Read::Failed(err) => {
                    self.stream = None;
                    self.ready.clear();
                    self.set_state(DecodeState::Failed);
                    return Err(err);
                }
            }
        }
    }

    /// Invoke `callback` once per event until the stream ends, fails, or is
    /// cancelled.
    pub async fn dispatch<F>(mut self, mut callback: F) -> Result<StreamOutcome, StreamError>
    where
        F: FnMut(ChatEvent),
    {
        while let Some(event) = self.next_event().await? {
            callback(event);
        }

        let stats = self.decoder.stats();
        if self.state == DecodeState::Cancelled {
            Ok(StreamOutcome::Cancelled(stats))
        } else {
            Ok(StreamOutcome::Completed(stats))
        }
    }

    /// Turn the reader into a pull-based stream of events.
    ///
    /// The stream ends after the last event, after cancellation, or right
    /// after yielding an error.
    pub fn into_stream(self) -> impl Stream<Item = Result<ChatEvent, StreamError>> + Send {
        stream::unfold(Some(self), |reader| async move {
            let mut reader = reader?;
            match reader.next_event().await {
                Ok(Some(event)) => Some((Ok(event), Some(reader))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }

    fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, CancellationToken::is_cancelled)
    }

    fn stop_cancelled(&mut self) {
        if self.state == DecodeState::Cancelled {
            return;
        }
        self.stream = None;
        self.ready.clear();
        self.set_state(DecodeState::Cancelled);
    }

    fn set_state(&mut self, state: DecodeState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "SSE decode state");
            self.state = state;
        }
    }
}

async fn read_next(
    stream: &mut ByteStream,
    cancel: Option<&CancellationToken>,
    idle_timeout: Option<Duration>,
) -> Read {
    let read = async {
        match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                Ok(item) => Read::from(item),
                Err(_) => Read::Failed(StreamError::Timeout { idle: limit }),
            },
            None => Read::from(stream.next().await),
        }
    };

    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Read::Cancelled,
            read = read => read,
        },
        None => read.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THINKING: &str = "data: {\"type\":\"thinking\",\"message\":\"Analizando\"}\n\n";
    const ROUTING: &str =
        "data: {\"type\":\"routing\",\"message\":\"Consultando\",\"specialists\":[\"sql_specialist\"]}\n\n";
    const COMPLETE: &str =
        "data: {\"type\":\"complete\",\"message\":\"Listo\",\"response\":\"42\"}\n\n";

    fn byte_stream(chunks: Vec<&'static [u8]>) -> ByteStream {
        Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))),
        ))
    }

    fn chunked(body: &'static str, size: usize) -> ByteStream {
        byte_stream(body.as_bytes().chunks(size).collect())
    }

    fn body() -> &'static str {
        Box::leak(format!("{}{}{}", THINKING, ROUTING, COMPLETE).into_boxed_str())
    }

    async fn collect(reader: EventReader) -> (Vec<ChatEvent>, StreamOutcome) {
        let mut events = Vec::new();
        let outcome = reader.dispatch(|event| events.push(event)).await.unwrap();
        (events, outcome)
    }

    #[tokio::test]
    async fn test_example_sequence() {
        let input: &'static str =
            Box::leak(format!("{}{}", THINKING, COMPLETE).into_boxed_str());
        let (events, outcome) = collect(EventReader::new(chunked(input, input.len()))).await;

        assert_eq!(
            events,
            vec![
                ChatEvent::Thinking {
                    message: "Analizando".to_string()
                },
                ChatEvent::Complete {
                    message: "Listo".to_string(),
                    response: "42".to_string(),
                    tools_used: vec![],
                    error: false,
                },
            ]
        );
        assert_eq!(outcome.stats().events, 2);
        assert!(!outcome.is_cancelled());
    }

    #[tokio::test]
    async fn test_chunking_invariance() {
        let input = body();
        let (whole, _) = collect(EventReader::new(chunked(input, input.len()))).await;
        let (bytewise, _) = collect(EventReader::new(chunked(input, 1))).await;
        let per_frame = byte_stream(vec![
            THINKING.as_bytes(),
            ROUTING.as_bytes(),
            COMPLETE.as_bytes(),
        ]);
        let (framewise, _) = collect(EventReader::new(per_frame)).await;

        assert_eq!(whole.len(), 3);
        assert_eq!(whole, bytewise);
        assert_eq!(whole, framewise);
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let mut reader = EventReader::new(chunked(THINKING, 8));
        assert_eq!(reader.state(), DecodeState::Idle);

        let event = reader.next_event().await.unwrap();
        assert!(event.is_some());
        assert_eq!(reader.state(), DecodeState::EmittingEvent);

        assert_eq!(reader.next_event().await.unwrap(), None);
        assert_eq!(reader.state(), DecodeState::Closed);
        assert!(reader.state().is_finished());

        // Closed readers stay closed
        assert_eq!(reader.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_stops_delivery() {
        let token = CancellationToken::new();
        let reader = EventReader::new(chunked(body(), 3)).with_cancellation(token.clone());

        let mut events = Vec::new();
        let outcome = reader
            .dispatch(|event| {
                events.push(event);
                token.cancel();
            })
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert!(outcome.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_chunk() {
        let token = CancellationToken::new();
        let stream: ByteStream = Box::pin(
            stream::iter(vec![Ok(Bytes::from_static(THINKING.as_bytes()))])
                .chain(stream::pending()),
        );
        let mut reader = EventReader::new(stream).with_cancellation(token.clone());

        assert!(reader.next_event().await.unwrap().is_some());

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        assert_eq!(reader.next_event().await.unwrap(), None);
        assert_eq!(reader.state(), DecodeState::Cancelled);
    }

    #[tokio::test]
    async fn test_read_failure_aborts() {
        let stream: ByteStream = Box::pin(
            stream::iter(vec![
                Ok(Bytes::from_static(THINKING.as_bytes())),
                Ok(Bytes::from_static(b"data: {\"type\":\"synth")),
            ])
            .chain(stream::once(async {
                Err(HttpError::Io("connection reset".to_string()))
            })),
        );

        let mut events = Vec::new();
        let result = EventReader::new(stream)
            .dispatch(|event| events.push(event))
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(result, Err(StreamError::ConnectionLost { .. })));
    }

    #[tokio::test]
    async fn test_idle_timeout() {
        let stream: ByteStream = Box::pin(stream::pending());
        let mut reader = EventReader::new(stream).with_idle_timeout(Duration::from_millis(20));

        let err = reader.next_event().await.unwrap_err();
        assert_eq!(
            err,
            StreamError::Timeout {
                idle: Duration::from_millis(20)
            }
        );
        assert_eq!(reader.state(), DecodeState::Failed);
    }

    #[tokio::test]
    async fn test_into_stream_yields_events_in_order() {
        let events: Vec<_> = EventReader::new(chunked(body(), 5))
            .into_stream()
            .collect()
            .await;

        let names: Vec<_> = events
            .iter()
            .map(|e| e.as_ref().unwrap().event_type_name())
            .collect();
        assert_eq!(names, vec!["thinking", "routing", "complete"]);
    }

    #[tokio::test]
    async fn test_into_stream_ends_after_error() {
        let stream: ByteStream = Box::pin(stream::once(async {
            Err(HttpError::Timeout("read timed out".to_string()))
        }));
        let items: Vec<_> = EventReader::new(stream).into_stream().collect().await;

        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
