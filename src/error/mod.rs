//! Error handling for the Brain client.
//!
//! - **Categories**: high-level classification for retry and messaging
//! - **Domain errors**: [`NetworkError`] for request/response calls,
//!   [`StreamError`] for chat streams that fail after they started
//! - **Unified type**: [`BrainError`] with the [`BrainResult`] alias
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, stream read failure | Yes |
//! | Server | Backend errors (5xx) | Yes |
//! | Client | Undecodable response body | No |
//! | User | Rejected input (4xx, invalid filters) | No |
//! | Configuration | Bad `BRAIN_*` values | No |
//!
//! Malformed SSE frames never reach this module: the decoder drops them and
//! counts them in [`crate::sse::DecodeStats`].

mod brain_error;
mod category;
mod network;
mod stream;

pub use brain_error::{BrainError, BrainResult};
pub use category::ErrorCategory;
pub use network::{classify_http_error, fastapi_detail, NetworkError, CONNECTIVITY_MESSAGE};
pub use stream::StreamError;
