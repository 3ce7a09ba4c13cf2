/// Execution Client - the relay's single outbound dependency
///
/// The relay only ever talks to the execution backend through
/// `ExecutionBackend`, so mapping and normalization can be exercised against
/// a fake implementation without a live network.

use async_trait::async_trait;
use playground_common::config::RelayConfig;
use playground_common::types::BackendPayload;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Added on top of the backend's own compile + run budget
const REQUEST_TIMEOUT_SLACK_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed backend response: {0}")]
    Parse(String),
}

/// Status and parsed body of one backend call
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: u16,
    pub body: Value,
}

impl BackendReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Submit one payload. No retries.
    async fn submit(&self, payload: &BackendPayload) -> Result<BackendReply, ClientError>;
}

/// Piston-compatible HTTP backend
pub struct PistonClient {
    url: String,
    client: Client,
}

impl PistonClient {
    pub fn new(config: &RelayConfig) -> Result<Self, ClientError> {
        let budget_ms = config.compile_timeout_ms + config.run_timeout_ms;
        let client = Client::builder()
            .timeout(Duration::from_millis(budget_ms) + Duration::from_secs(REQUEST_TIMEOUT_SLACK_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            url: config.backend_url.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ExecutionBackend for PistonClient {
    #[instrument(skip(self, payload), fields(language = %payload.language))]
    async fn submit(&self, payload: &BackendPayload) -> Result<BackendReply, ClientError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        debug!(status = status.as_u16(), bytes = text.len(), "Backend replied");

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(ClientError::Parse(e.to_string())),
            // error pages are passed through verbatim
            Err(_) => Value::String(text),
        };

        Ok(BackendReply {
            status: status.as_u16(),
            body,
        })
    }
}
