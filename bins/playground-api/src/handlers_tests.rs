/// Integration tests for the HTTP surface of the relay
///
/// The router is driven in-process with `tower::ServiceExt::oneshot` and a
/// fake execution backend, so these run without network access.

#[cfg(test)]
mod relay_http_tests {
    use crate::client::ClientError;
    use crate::relay::tests::FakeBackend;
    use crate::relay::Relay;
    use crate::routes;
    use crate::AppState;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use playground_common::config::RelayConfig;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(backend: Arc<FakeBackend>) -> axum::Router {
        let state = Arc::new(AppState::new(Relay::new(RelayConfig::default(), backend)));
        routes::app(state, &[])
    }

    fn run_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/exec/run")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_run_python_success() {
        let backend = FakeBackend::replying(
            200,
            json!({
                "language": "python",
                "version": "3.10.0",
                "run": { "stdout": "hi\n", "stderr": "", "code": 0, "signal": null, "output": "hi\n" }
            }),
        );
        let app = app_with(backend.clone());

        let (status, body) = send(
            app,
            run_request(r#"{"language":"python","code":"print('hi')"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["language"], "python");
        assert_eq!(body["stdout"], "hi\n");
        assert_eq!(body["stderr"], "");
        assert_eq!(body["output"], "hi\n");
        assert_eq!(body["code"], 0);
        assert_eq!(body["signal"], Value::Null);
        assert_eq!(body["compile_stdout"], "");
        assert_eq!(body["compile_stderr"], "");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_code_is_400_without_backend_call() {
        let backend = FakeBackend::replying(200, json!({}));
        let app = app_with(backend.clone());

        let (status, body) = send(app, run_request(r#"{"language":"python"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "success": false, "message": "language and code are required" })
        );
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_language_is_400() {
        let backend = FakeBackend::replying(200, json!({}));
        let app = app_with(backend.clone());

        let (status, _) = send(app, run_request(r#"{"language":"","code":"1"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_loosely_typed_stdin_and_args_are_forwarded() {
        let backend = FakeBackend::replying(200, json!({ "run": { "stdout": "ok" } }));
        let app = app_with(backend.clone());

        let (status, _) = send(
            app,
            run_request(r#"{"language":"python","code":"x","stdin":5,"args":[1]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let payload = &backend.payloads.lock().unwrap()[0];
        assert_eq!(payload.stdin, "5");
        assert_eq!(payload.args, vec!["1"]);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_400() {
        let backend = FakeBackend::replying(200, json!({}));
        let app = app_with(backend.clone());

        let (status, body) = send(app, run_request("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "language and code are required");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_backend_error_is_502_with_details() {
        let details = json!({ "message": "cobol-* runtime is unknown" });
        let app = app_with(FakeBackend::replying(400, details.clone()));

        let (status, body) = send(
            app,
            run_request(r#"{"language":"cobol","code":"DISPLAY 'HI'."}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Execution service error");
        assert_eq!(body["details"], details);
    }

    #[tokio::test]
    async fn test_network_failure_is_500() {
        let app = app_with(FakeBackend::failing(ClientError::Network(
            "connection refused".to_string(),
        )));

        let (status, body) = send(
            app,
            run_request(r#"{"language":"go","code":"package main"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal execution error");
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_compile_diagnostics_are_forwarded() {
        let app = app_with(FakeBackend::replying(
            200,
            json!({
                "compile": { "stdout": "", "stderr": "error[E0425]: cannot find value `x`", "code": 1 },
                "run": { "stdout": "", "stderr": "", "code": null, "signal": null }
            }),
        ));

        let (status, body) = send(
            app,
            run_request(r#"{"language":"Rust","code":"fn main(){x}"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["language"], "rust");
        assert_eq!(body["compile_stderr"], "error[E0425]: cannot find value `x`");
        assert_eq!(body["code"], Value::Null);
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app_with(FakeBackend::replying(200, json!({})));

        let request = Request::builder().uri("/status").body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = app_with(FakeBackend::replying(200, json!({})));
        let _ = send(
            app.clone(),
            run_request(r#"{"language":"python","code":"1"}"#),
        )
        .await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("playground_exec_requests_total"));
    }

    #[tokio::test]
    async fn test_cors_preflight_is_answered() {
        let app = app_with(FakeBackend::replying(200, json!({})));

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/exec/run")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
