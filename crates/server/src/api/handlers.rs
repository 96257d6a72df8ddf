use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use animelog_core::{watch_count::WatchCountDocument, Config, PlanningData, SeriesStatusTree};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub history_entries: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        history_entries: state.coordinator().snapshot().history().len(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

pub async fn get_series_status(State(state): State<Arc<AppState>>) -> Json<SeriesStatusTree> {
    Json(state.coordinator().series_status())
}

pub async fn get_watch_count(State(state): State<Arc<AppState>>) -> Json<WatchCountDocument> {
    Json(state.coordinator().snapshot().watch_counts().to_document())
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Stored weekly planning; empty when nothing was saved yet.
pub async fn get_planning(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlanningData>, (StatusCode, Json<ErrorResponse>)> {
    match state.planning().load() {
        Ok(planning) => Ok(Json(planning.unwrap_or_default())),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
