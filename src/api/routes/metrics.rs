//! Request counters and cache size.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::server::AppState;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.polisher.metrics().snapshot();
    let mut body = serde_json::to_value(snapshot).unwrap_or_else(|_| json!({}));
    body["store_entries"] = json!(state.polisher.store().len().await);
    Json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{digest, IdiomStore};
    use crate::polish::{PolishOptions, Polisher};
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_metrics_counts_requests_and_entries() {
        let store = IdiomStore::open_in_memory().unwrap();
        store.put(digest("a"), "a", &json!({"idiom": "甲"})).await;
        let options = PolishOptions {
            cache_hit_delay: Duration::ZERO,
            ..PolishOptions::default()
        };
        let state = Arc::new(AppState::new(Polisher::new(store, None, options)));
        state.polisher.polish("a").await.unwrap();
        state.polisher.polish("b").await.unwrap();

        let Json(body) = get_metrics(State(state)).await;
        assert_eq!(body["requests"], 2);
        assert_eq!(body["cache_hits"], 1);
        assert_eq!(body["not_configured"], 1);
        assert_eq!(body["store_entries"], 1);
    }
}
