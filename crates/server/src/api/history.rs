//! Paginated history queries.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use animelog_core::{HistoryEntry, HistoryFilter};

use crate::state::AppState;

/// Maximum allowed limit for history queries
const MAX_LIMIT: usize = 1000;

/// Default limit for history queries
const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub anime_name: Option<String>,
    pub language: Option<String>,
    pub date_from: Option<i64>,
    pub date_to: Option<i64>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub history: Vec<HistoryEntry>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryPage> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let mut filter = HistoryFilter::new().with_time_range(params.date_from, params.date_to);
    if let Some(name) = params.anime_name {
        filter = filter.with_anime_name(name);
    }
    if let Some(language) = params.language {
        filter = filter.with_language(language);
    }

    let matching = state.coordinator().query_history(&filter);
    let total = matching.len();
    let history = matching.into_iter().skip(offset).take(limit).collect();

    Json(HistoryPage {
        history,
        total,
        limit,
        offset,
    })
}
