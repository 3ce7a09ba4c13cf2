// HTTP route handlers for the playground relay

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use playground_common::types::RunRequest;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::RelayError;
use crate::metrics;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: i64,
}

/// POST /exec/run - Relay one run to the execution backend
pub async fn run_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    // An unreadable body is treated like an empty one
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(request_id = %request_id, error = %rejection, "Unreadable run request body");
            RunRequest::default()
        }
    };

    let result = state.relay.run(&request).await;
    let elapsed = start.elapsed();

    match result {
        Ok(result) => {
            info!(
                request_id = %request_id,
                language = %result.language,
                exit_code = ?result.exit_code,
                elapsed_ms = elapsed.as_millis() as u64,
                "Run completed"
            );
            metrics::record("ok", elapsed.as_secs_f64());
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(err) => {
            match &err {
                RelayError::MissingFields => {
                    warn!(request_id = %request_id, "Run rejected: language and code are required");
                }
                RelayError::Backend { status, .. } => {
                    warn!(request_id = %request_id, backend_status = status, "Execution service error");
                }
                RelayError::Internal(message) => {
                    error!(request_id = %request_id, error = %message, "Exec run error");
                }
            }
            metrics::record(err.outcome(), elapsed.as_secs_f64());
            err.into_response()
        }
    }
}

/// GET /status - Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = chrono::Utc::now() - state.started_at;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            started_at: state.started_at,
            uptime_seconds: uptime.num_seconds(),
        }),
    )
}

/// GET /metrics - Prometheus exposition
pub async fn metrics_handler() -> Response {
    match metrics::gather() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
