//! Client for the Brain dashboard API.
//!
//! One method per backend endpoint, plus [`BrainClient::stream_chat`] which
//! drives the multi-agent chat over SSE.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{classify_http_error, fastapi_detail, BrainResult, NetworkError};
use crate::models::{
    AiHealth, AnalysisRequest, AnalysisResponse, CategoryList, ChatRequest, ChatResponse,
    DataFilters, DataVisualization, DiagramResponse, HealthStatus, InsightSummary, PoolStatus,
    VisualizeRequest,
};
use crate::sse::{ChatEvent, DecodeStats, EventReader, StreamOutcome};
use crate::traits::{Headers, HttpClient, Response};

/// Client for the Brain API.
///
/// Generic over the transport so tests can swap in
/// [`MockHttpClient`](crate::adapters::MockHttpClient).
#[derive(Debug, Clone)]
pub struct BrainClient<C: HttpClient = ReqwestHttpClient> {
    base_url: String,
    http: C,
    stream_idle_timeout: Duration,
}

impl BrainClient<ReqwestHttpClient> {
    /// Client with the default configuration.
    pub fn new() -> BrainResult<Self> {
        Self::from_config(&ClientConfig::default())
    }

    pub fn from_config(config: &ClientConfig) -> BrainResult<Self> {
        config.validate()?;
        let http = ReqwestHttpClient::from_config(config)?;
        Ok(Self::with_http_client(http, config))
    }
}

impl<C: HttpClient> BrainClient<C> {
    pub fn with_http_client(http: C, config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            http,
            stream_idle_timeout: config.stream_idle_timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http_client(&self) -> &C {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /health`: service and database status.
    pub async fn health(&self) -> BrainResult<HealthStatus> {
        self.get_json("/health").await
    }

    /// `GET /db/pool-status`
    pub async fn pool_status(&self) -> BrainResult<PoolStatus> {
        self.get_json("/db/pool-status").await
    }

    /// `GET /insights`: landing page metrics.
    pub async fn insights(&self) -> BrainResult<InsightSummary> {
        self.get_json("/insights").await
    }

    /// `GET /data/visualization` with the given filters.
    ///
    /// Filters are validated before any request is sent.
    pub async fn visualization(&self, filters: &DataFilters) -> BrainResult<DataVisualization> {
        filters.validate()?;
        let query = filters.to_query_string();
        if query.is_empty() {
            self.get_json("/data/visualization").await
        } else {
            self.get_json(&format!("/data/visualization?{}", query))
                .await
        }
    }

    /// `GET /data/categories`
    pub async fn categories(&self) -> BrainResult<CategoryList> {
        self.get_json("/data/categories").await
    }

    /// `POST /ai/chat`: whole answer in one response.
    pub async fn chat(&self, request: &ChatRequest) -> BrainResult<ChatResponse> {
        self.post_json("/ai/chat", request).await
    }

    /// `POST /ai/analyze`
    pub async fn analyze(&self, query: impl Into<String>) -> BrainResult<AnalysisResponse> {
        let request = AnalysisRequest {
            query: query.into(),
        };
        self.post_json("/ai/analyze", &request).await
    }

    /// `POST /ai/visualize`: ask the assistant for a Mermaid diagram.
    pub async fn visualize(&self, description: impl Into<String>) -> BrainResult<DiagramResponse> {
        let request = VisualizeRequest {
            description: description.into(),
        };
        self.post_json("/ai/visualize", &request).await
    }

    /// `GET /ai/health`
    pub async fn ai_health(&self) -> BrainResult<AiHealth> {
        self.get_json("/ai/health").await
    }

    /// Open `POST /ai/chat/stream` and return a reader over its events.
    ///
    /// A non-success status fails here, before any event is read.
    pub async fn open_chat_stream(&self, request: &ChatRequest) -> BrainResult<EventReader> {
        let url = self.url("/ai/chat/stream");
        let body = serde_json::to_string(request)?;
        let mut headers = json_headers();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        info!(url = %url, history = request.chat_history.len(), "Opening chat stream");
        let stream = self
            .http
            .post_stream(&url, &body, &headers)
            .await
            .map_err(|e| classify_http_error(e, &url))?;

        Ok(EventReader::new(stream).with_idle_timeout(self.stream_idle_timeout))
    }

    /// Stream a chat answer, calling `on_event` once per event in order.
    ///
    /// Cancelling `cancel` stops delivery, releases the connection, and
    /// resolves with [`StreamOutcome::Cancelled`].
    pub async fn stream_chat<F>(
        &self,
        request: &ChatRequest,
        cancel: Option<CancellationToken>,
        on_event: F,
    ) -> BrainResult<StreamOutcome>
    where
        F: FnMut(ChatEvent),
    {
        let reader = match &cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Chat stream cancelled before the response started");
                    return Ok(StreamOutcome::Cancelled(DecodeStats::default()));
                }
                reader = self.open_chat_stream(request) => reader?,
            },
            None => self.open_chat_stream(request).await?,
        };

        let reader = match cancel {
            Some(token) => reader.with_cancellation(token),
            None => reader,
        };

        let outcome = reader.dispatch(on_event).await?;
        info!(
            cancelled = outcome.is_cancelled(),
            events = outcome.stats().events,
            "Chat stream finished"
        );
        Ok(outcome)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BrainResult<T> {
        let url = self.url(path);
        info!(method = "GET", url = %url, "Brain API request");
        let response = self
            .http
            .get(&url, &json_headers())
            .await
            .map_err(|e| classify_http_error(e, &url))?;
        decode_response(response, &url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> BrainResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let body = serde_json::to_string(body)?;
        info!(method = "POST", url = %url, "Brain API request");
        let response = self
            .http
            .post(&url, &body, &json_headers())
            .await
            .map_err(|e| classify_http_error(e, &url))?;
        decode_response(response, &url)
    }
}

fn json_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers
}

fn decode_response<T: DeserializeOwned>(response: Response, url: &str) -> BrainResult<T> {
    debug!(status = response.status, url = %url, "Brain API response");
    if !response.is_success() {
        return Err(NetworkError::HttpStatus {
            status: response.status,
            message: fastapi_detail(&response.text_lossy()),
        }
        .into());
    }
    response.json().map_err(|e| {
        NetworkError::InvalidResponse {
            message: format!("{}: {}", url, e),
        }
        .into()
    })
}
