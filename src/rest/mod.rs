//! HTTP surface: Slack webhooks plus health and status.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::ApiState;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Slack webhooks
        .route("/slack/commands", post(routes::slack::command))
        .route("/slack/actions", post(routes::slack::action))
        // Health endpoints
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/status", get(routes::health::status))
        .route("/api/v1/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(ApiDoc::openapi())
}

/// Start the server and run until Ctrl-C
pub async fn serve(state: ApiState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()
        .context("Invalid server address")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::api::ApiError;
    use crate::config::Config;
    use crate::deliver::blocks::Presentation;
    use crate::deliver::models::CurrentVersion;
    use crate::deliver::ports::SourceControl;
    use crate::deliver::{WizardEngine, WizardRegistry, WizardSettings};
    use crate::slack::message::ResponseType;

    struct EmptySource;

    #[async_trait]
    impl SourceControl for EmptySource {
        async fn fetch_branches(&self) -> Result<Vec<String>, ApiError> {
            Ok(vec!["main".to_string()])
        }

        async fn fetch_version(&self, _branch: &str) -> Result<CurrentVersion, ApiError> {
            Ok(CurrentVersion {
                version: "1.0.0".to_string(),
                build_version: 1,
            })
        }
    }

    fn state(verification_token: Option<&str>) -> ApiState {
        let engine = WizardEngine::new(
            WizardSettings {
                command: "/deliver".to_string(),
                default_branch: "main".to_string(),
                presentation: Presentation {
                    title: "Deliver".to_string(),
                    action_prefix: "deliver".to_string(),
                    response_type: ResponseType::InChannel,
                },
            },
            Arc::new(EmptySource),
            Vec::new(),
        );
        let mut config = Config::default();
        config.slack.verification_token = verification_token.map(str::to_string);
        ApiState::new(config, WizardRegistry::new(vec![engine]))
    }

    fn form(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn command_form(command: &str, token: &str) -> String {
        serde_urlencoded::to_string([
            ("command", command),
            ("text", ""),
            ("user_id", "U1"),
            ("user_name", "alice"),
            ("channel_id", "C1"),
            ("response_url", "http://127.0.0.1:9/hook"),
            ("token", token),
        ])
        .unwrap()
    }

    fn action_form(payload: &serde_json::Value) -> String {
        serde_urlencoded::to_string([("payload", payload.to_string())]).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = build_router(state(None));
        let response = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_lists_wizards() {
        let app = build_router(state(None));
        let response = app
            .oneshot(Request::get("/api/v1/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["wizards"][0]["command"], "/deliver");
    }

    #[tokio::test]
    async fn test_command_accepted() {
        let app = build_router(state(None));
        let response = app
            .oneshot(form("/slack/commands", command_form("/deliver", "t")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_command_with_wrong_token_rejected() {
        let app = build_router(state(Some("expected")));
        let response = app
            .oneshot(form("/slack/commands", command_form("/deliver", "wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_command_not_found() {
        let app = build_router(state(None));
        let response = app
            .oneshot(form("/slack/commands", command_form("/other", "t")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_action_payload() {
        let app = build_router(state(None));
        let response = app
            .oneshot(form("/slack/actions", "payload=not-json".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_interaction_types_ignored() {
        let app = build_router(state(None));
        let payload = serde_json::json!({
            "type": "view_submission",
            "user": {"id": "U1"},
            "token": "t"
        });
        let response = app
            .oneshot(form("/slack/actions", action_form(&payload)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_foreign_action_ignored() {
        let app = build_router(state(None));
        let payload = serde_json::json!({
            "type": "block_actions",
            "user": {"id": "U1"},
            "token": "t",
            "response_url": "http://127.0.0.1:9/hook",
            "actions": [{"type": "button", "action_id": "someone-else", "value": "x"}]
        });
        let response = app
            .oneshot(form("/slack/actions", action_form(&payload)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_route() {
        let app = build_router(state(None));
        let response = app
            .oneshot(Request::get("/api/v1/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
