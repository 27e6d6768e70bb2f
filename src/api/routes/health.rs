//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::server::AppState;

/// GET /health — returns version and whether a model key is configured.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_configured": state.polisher.is_configured(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::IdiomStore;
    use crate::polish::{PolishOptions, Polisher};

    #[tokio::test]
    async fn test_get_health_returns_ok() {
        let store = IdiomStore::open_in_memory().unwrap();
        let state = AppState::new(Polisher::new(store, None, PolishOptions::default()));
        let Json(body) = get_health(State(Arc::new(state))).await;
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
        assert_eq!(body["model_configured"], false);
    }
}
