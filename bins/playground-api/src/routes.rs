// Route table and middleware stack

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

const CORS_MAX_AGE: Duration = Duration::from_secs(86400);

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exec/run", post(handlers::run_code))
        .route("/status", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
}

/// Permissive when no origins are configured; otherwise an explicit
/// allow-list with credentials, as browsers require.
pub fn cors_layer(origins: &[axum::http::HeaderValue]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(CORS_MAX_AGE);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

pub fn app(state: Arc<AppState>, origins: &[axum::http::HeaderValue]) -> Router {
    routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(origins))
        .with_state(state)
}
