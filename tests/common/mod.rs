//! Shared helpers for integration tests.

#![allow(dead_code)]

use brain::adapters::mock::MockHttpClient;
use brain::{BrainClient, ClientConfig};
use serde_json::Value;
use wiremock::MockServer;

/// Base URL used with `MockHttpClient`.
pub const MOCK_BASE: &str = "http://brain.test/api";

/// URL of the streaming chat endpoint under [`MOCK_BASE`].
pub const MOCK_STREAM_URL: &str = "http://brain.test/api/ai/chat/stream";

/// A reqwest-backed client pointed at the mock server's `/api` root.
pub fn client_for(server: &MockServer) -> BrainClient {
    let config = ClientConfig::default().with_base_url(format!("{}/api", server.uri()));
    BrainClient::from_config(&config).expect("valid client config")
}

/// A client over `MockHttpClient`, for chunking and failure scenarios.
pub fn mock_client(config: ClientConfig) -> BrainClient<MockHttpClient> {
    BrainClient::with_http_client(MockHttpClient::new(), &config.with_base_url(MOCK_BASE))
}

/// Serialize events as one `data:` frame each.
pub fn sse_body(events: &[Value]) -> String {
    events
        .iter()
        .map(|event| format!("data: {}\n\n", event))
        .collect()
}
