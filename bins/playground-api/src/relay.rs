/// Execution Relay
///
/// Validates a run request, maps the language name to the backend's
/// canonical identifier, forwards exactly one payload, and reshapes the reply
/// into a `RunResult`.
///
/// Code is never inspected, sanitized or size-limited here; resource limits
/// belong to the backend. Nothing is retried.

use playground_common::config::{RelayConfig, LATEST_VERSION};
use playground_common::types::{BackendPayload, BackendResponse, RunRequest, RunResult, SourceFile};
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::ExecutionBackend;
use crate::error::RelayError;

pub struct Relay {
    config: RelayConfig,
    backend: Arc<dyn ExecutionBackend>,
}

impl Relay {
    pub fn new(config: RelayConfig, backend: Arc<dyn ExecutionBackend>) -> Self {
        Self { config, backend }
    }

    /// Build the backend payload for an already-validated request
    pub fn build_payload(&self, request: &RunRequest) -> BackendPayload {
        BackendPayload {
            language: self.config.language_aliases.resolve(&request.language),
            version: LATEST_VERSION.to_string(),
            files: vec![SourceFile {
                content: request.code.clone(),
            }],
            stdin: request.stdin.clone(),
            args: request.args.clone(),
            compile_timeout: self.config.compile_timeout_ms,
            run_timeout: self.config.run_timeout_ms,
            compile_memory_limit: self.config.memory_limit,
            run_memory_limit: self.config.memory_limit,
        }
    }

    pub async fn run(&self, request: &RunRequest) -> Result<RunResult, RelayError> {
        if !request.has_required_fields() {
            return Err(RelayError::MissingFields);
        }

        let payload = self.build_payload(request);
        info!(
            requested = %request.language,
            language = %payload.language,
            source_size = request.code.len(),
            stdin_size = request.stdin.len(),
            args = request.args.len(),
            "Forwarding run to execution backend"
        );

        let reply = self.backend.submit(&payload).await?;

        if !reply.is_success() {
            warn!(status = reply.status, language = %payload.language, "Execution backend rejected run");
            return Err(RelayError::Backend {
                status: reply.status,
                details: reply.body,
            });
        }

        let response: BackendResponse = serde_json::from_value(reply.body)
            .map_err(|e| RelayError::Internal(format!("Malformed backend response: {}", e)))?;

        Ok(RunResult::from_backend(payload.language, &response))
    }
}
