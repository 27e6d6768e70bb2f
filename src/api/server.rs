//! Axum HTTP server for the polish endpoint.

use crate::api::config::ServerConfig;
use crate::polish::Polisher;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    /// The orchestrator; owns the store handle and the model client.
    pub polisher: Arc<Polisher>,
}

impl AppState {
    pub fn new(polisher: Polisher) -> Self {
        Self {
            polisher: Arc::new(polisher),
        }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState, body_limit: usize) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/polish", post(super::routes::polish::polish))
        .route("/health", get(super::routes::health::get_health))
        .route("/metrics", get(super::routes::metrics::get_metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server and run until Ctrl-C.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let metrics = state.polisher.metrics().clone();
    let app = build_router(state, config.body_limit);
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Polish API server listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    metrics.emit_usage("shutdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::IdiomStore;
    use crate::polish::PolishOptions;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn unconfigured_state() -> AppState {
        let store = IdiomStore::open_in_memory().unwrap();
        AppState::new(Polisher::new(store, None, PolishOptions::default()))
    }

    #[test]
    fn test_build_router() {
        let _router = build_router(unconfigured_state(), 1024);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(unconfigured_state(), 1024);
        let req = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_on_polish_is_method_not_allowed() {
        let app = build_router(unconfigured_state(), 1024);
        let req = Request::builder()
            .uri("/polish")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let app = build_router(unconfigured_state(), 64);
        let body = format!(r#"{{"text":"{}"}}"#, "a".repeat(256));
        let req = Request::builder()
            .method("POST")
            .uri("/polish")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
