//! `POST /polish` — turn slang into an idiom document.
//!
//! Always answers 200 with a document, except for an empty or unreadable
//! request, which gets 400 and `{"error": ...}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::server::AppState;
use crate::error::PolishError;

/// Request body. A missing `text` is treated as empty.
#[derive(Debug, Deserialize)]
pub struct PolishRequest {
    #[serde(default)]
    pub text: String,
}

pub async fn polish(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PolishRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            debug!("Rejected polish body: {}", rejection.body_text());
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            return (status, Json(json!({ "error": rejection.body_text() })));
        }
    };

    match state.polisher.polish(&request.text).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.into_document())),
        Err(PolishError::InvalidInput(message)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
        }
        Err(e) => {
            warn!("Polish failed unexpectedly: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
        }
    }
}
