// HTTP client for the relay's /exec/run endpoint

use anyhow::{bail, Context, Result};
use playground_common::runner::RunOutcome;
use playground_common::types::{RunRequest, RunResult};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Matches the browser client's request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub struct RelayClient {
    run_url: String,
    client: Client,
}

impl RelayClient {
    pub fn new(server: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            run_url: format!("{}/exec/run", server.trim_end_matches('/')),
            client,
        })
    }

    /// One run; every failure shape becomes `RunOutcome::Failed`
    pub async fn run(&self, request: &RunRequest) -> RunOutcome {
        match self.try_run(request).await {
            Ok(result) => RunOutcome::Completed(result),
            Err(e) => RunOutcome::failed(format!("{:#}", e)),
        }
    }

    async fn try_run(&self, request: &RunRequest) -> Result<RunResult> {
        tracing::debug!(url = %self.run_url, language = %request.language, "Submitting run");

        let response = self
            .client
            .post(&self.run_url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to reach relay at {}", self.run_url))?;

        let status = response.status();
        if status == StatusCode::OK {
            return response
                .json::<RunResult>()
                .await
                .context("Relay returned an unreadable result");
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        bail!(describe_failure(status, &body))
    }
}

/// Human-readable summary of a non-200 relay reply
fn describe_failure(status: StatusCode, body: &Value) -> String {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Execution failed");

    let detail = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| match body.get("details") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| Some(Value::Object(map.clone()).to_string())),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        });

    match detail {
        Some(detail) => format!("{} ({}): {}", message, status.as_u16(), detail),
        None => format!("{} ({})", message, status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn spawn_relay(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn test_describe_backend_failure() {
        let body = json!({
            "success": false,
            "message": "Execution service error",
            "details": { "message": "cobol-* runtime is unknown" }
        });
        assert_eq!(
            describe_failure(StatusCode::BAD_GATEWAY, &body),
            "Execution service error (502): cobol-* runtime is unknown"
        );
    }

    #[test]
    fn test_describe_internal_failure() {
        let body = json!({
            "success": false,
            "message": "Internal execution error",
            "error": "Network error: timed out"
        });
        assert_eq!(
            describe_failure(StatusCode::INTERNAL_SERVER_ERROR, &body),
            "Internal execution error (500): Network error: timed out"
        );
    }

    #[test]
    fn test_describe_without_body() {
        assert_eq!(
            describe_failure(StatusCode::NOT_FOUND, &Value::Null),
            "Execution failed (404)"
        );
    }

    #[tokio::test]
    async fn test_run_success() {
        let app = Router::new().route(
            "/exec/run",
            post(|Json(req): Json<RunRequest>| async move {
                Json(json!({
                    "success": true,
                    "language": req.language,
                    "stdout": "hi\n",
                    "stderr": "",
                    "output": "hi\n",
                    "code": 0,
                    "signal": null,
                    "time": null,
                    "memory": null,
                    "compile_stdout": "",
                    "compile_stderr": ""
                }))
            }),
        );
        let client = RelayClient::new(&spawn_relay(app).await).unwrap();

        let outcome = client.run(&RunRequest::new("python", "print('hi')")).await;

        match outcome {
            RunOutcome::Completed(result) => {
                assert_eq!(result.language, "python");
                assert_eq!(result.stdout, "hi\n");
                assert_eq!(result.exit_code, Some(0));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_validation_failure() {
        let app = Router::new().route(
            "/exec/run",
            post(|| async {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({ "success": false, "message": "language and code are required" })),
                )
            }),
        );
        let client = RelayClient::new(&spawn_relay(app).await).unwrap();

        let outcome = client.run(&RunRequest::new("python", "")).await;

        assert_eq!(
            outcome,
            RunOutcome::failed("language and code are required (400)")
        );
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RelayClient::new(&format!("http://{}", addr)).unwrap();
        match client.run(&RunRequest::new("python", "1")).await {
            RunOutcome::Failed { error } => assert!(error.contains("Failed to reach relay")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
