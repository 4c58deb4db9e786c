//! Axum route handlers for the bridge HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`        - Returns `{"status": "ok", "version": ..., "service": "ha-bridge"}`
//! - `GET  /tools`         - Operation catalogue with read/write tags and input schemas
//! - `POST /tools/{name}`  - Invoke one operation; body is the input object

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::BridgeError;
use crate::tools::ToolRegistry;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/{name}", post(invoke_tool_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl BridgeError {
    fn http_status(&self) -> StatusCode {
        match self {
            BridgeError::Authorization(_) => StatusCode::FORBIDDEN,
            BridgeError::Validation(_) => StatusCode::BAD_REQUEST,
            BridgeError::UnknownTool(_) => StatusCode::NOT_FOUND,
            BridgeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            BridgeError::Transport { .. } | BridgeError::Decode(_) | BridgeError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            BridgeError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let BridgeError::Transport { status_code, body: text } = &self {
            body["status_code"] = json!(status_code);
            body["body"] = json!(text);
        }
        (status, Json(body)).into_response()
    }
}

/// GET /health - liveness probe. Does not contact the hub.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "ha-bridge",
    }))
}

/// GET /tools - list every operation.
async fn list_tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.registry.catalog() }))
}

/// POST /tools/{name} - invoke an operation.
///
/// An empty body is the same as `{}`.
async fn invoke_tool_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, BridgeError> {
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| BridgeError::Validation(format!("Invalid JSON body: {}", e)))?
    };

    let result = state.registry.invoke(&name, input).await.map_err(|e| {
        tracing::warn!(tool = %name, kind = e.kind(), "tool invocation failed: {}", e);
        e
    })?;
    Ok(Json(json!({ "result": result })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::tools::testing::{state as entity, FakeFailure, FakeHub};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app_with(config: PolicyConfig, hub: FakeHub) -> Router {
        let registry = ToolRegistry::new(config, Arc::new(hub));
        app_router(AppState::new(registry))
    }

    fn app() -> Router {
        app_with(PolicyConfig::new("http://ha:8123", "t"), FakeHub::default())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "ha-bridge");
    }

    #[tokio::test]
    async fn test_list_tools() {
        let request = Request::builder().uri("/tools").body(Body::empty()).unwrap();
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        let tools = json["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 34);
        assert!(tools.iter().any(|t| t["name"] == "ha_notify" && t["read_only"] == false));
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let hub = FakeHub::with_states(vec![entity("light.kitchen", "on", json!({}))]);
        let app = app_with(PolicyConfig::new("http://ha:8123", "t"), hub);
        let (status, json) = send(app, post("/tools/ha_list_entities", r#"{"domain":"light"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"][0]["entity_id"], "light.kitchen");
    }

    #[tokio::test]
    async fn test_invoke_with_empty_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/tools/ha_status")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"]["version"], "2026.2.0");
    }

    #[tokio::test]
    async fn test_read_only_maps_to_forbidden() {
        let config = PolicyConfig::new("http://ha:8123", "t").with_read_only(true);
        let app = app_with(config, FakeHub::default());
        let (status, json) = send(app, post("/tools/ha_light_on", r#"{"entity_id":"light.a"}"#)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["kind"], "authorization");
        assert_eq!(json["error"], "Tool ha_light_on is blocked because readOnly=true");
    }

    #[tokio::test]
    async fn test_validation_maps_to_bad_request() {
        let (status, json) = send(
            app(),
            post("/tools/ha_cover_position", r#"{"entity_id":"cover.g","position":101}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "position must be between 0 and 100");

        let (status, json) = send(app(), post("/tools/ha_status", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");
    }

    #[tokio::test]
    async fn test_unknown_tool_maps_to_not_found() {
        let (status, json) = send(app(), post("/tools/ha_teleport", "{}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["kind"], "unknown_tool");
    }

    #[tokio::test]
    async fn test_hub_errors_map_to_gateway_statuses() {
        let config = PolicyConfig::new("http://ha:8123", "t");
        let app = app_with(config.clone(), FakeHub::failing(FakeFailure::Transport(404, "Entity not found.")));
        let (status, json) = send(app, post("/tools/ha_get_state", r#"{"entity_id":"light.x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["kind"], "transport");
        assert_eq!(json["status_code"], 404);
        assert_eq!(json["body"], "Entity not found.");

        let app = app_with(config, FakeHub::failing(FakeFailure::Timeout));
        let (status, json) = send(app, post("/tools/ha_status", "{}")).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["kind"], "timeout");
    }

    #[test]
    fn test_configuration_error_status() {
        let err = BridgeError::Configuration("bad".to_string());
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
