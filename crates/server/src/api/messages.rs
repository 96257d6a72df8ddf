//! Message contract over HTTP.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use animelog_core::Response;

use crate::state::AppState;

/// Handle one contract message. Always 200; failures live in the envelope.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(message): Json<Value>,
) -> Json<Response> {
    Json(state.messages().handle(message).await)
}
