//! Brain - client for the mental-health admissions dashboard API
//!
//! Typed access to the dashboard's metrics, filtered visualization data and
//! the multi-agent AI assistant, including its SSE progress stream.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod diagram;
pub mod error;
pub mod models;
pub mod progress;
pub mod sse;
pub mod traits;

pub use client::BrainClient;
pub use config::ClientConfig;
pub use error::{BrainError, BrainResult};
pub use sse::{ChatEvent, StreamOutcome};
