use serde::{Deserialize, Serialize};

use crate::event::RawEvent;
use crate::history::{HistoryEntry, HistoryFilter};
use crate::planning::PlanningData;
use crate::series_status::{CompletionTarget, SeriesStatusTree};
use crate::watch_count::{EpisodeSlot, SeriesKey, WatchCountDocument};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    SaveHistory {
        data: RawEvent,
    },
    GetHistory {
        #[serde(default)]
        filters: HistoryFilter,
    },
    UpdateWatchCount {
        data: WatchCountUpdate,
    },
    GetSeriesStatus,
    GetWatchCount,
    SavePlanningData {
        data: PlanningData,
    },
    GetPlanningData,
    SetCompletion {
        data: CompletionUpdate,
    },
    ResetTracking,
    #[serde(other)]
    Unknown,
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::SaveHistory { .. } => "SAVE_HISTORY",
            Request::GetHistory { .. } => "GET_HISTORY",
            Request::UpdateWatchCount { .. } => "UPDATE_WATCH_COUNT",
            Request::GetSeriesStatus => "GET_SERIES_STATUS",
            Request::GetWatchCount => "GET_WATCH_COUNT",
            Request::SavePlanningData { .. } => "SAVE_PLANNING_DATA",
            Request::GetPlanningData => "GET_PLANNING_DATA",
            Request::SetCompletion { .. } => "SET_COMPLETION",
            Request::ResetTracking => "RESET_TRACKING",
            Request::Unknown => "UNKNOWN",
        }
    }
}

/// Episode reference in a count correction: a number, or `"unknown"` for
/// the bucket of events without a detected episode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EpisodeRef {
    Number(u32),
    Text(String),
}

impl EpisodeRef {
    pub fn to_slot(&self) -> Option<EpisodeSlot> {
        match self {
            EpisodeRef::Number(n) => Some(EpisodeSlot::Number(*n)),
            EpisodeRef::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("unknown") {
                    Some(EpisodeSlot::Unknown)
                } else {
                    text.parse().ok().map(EpisodeSlot::Number)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchCountUpdate {
    #[serde(alias = "seriesId")]
    pub anime_name: String,
    pub season: String,
    pub language: String,
    pub episode: EpisodeRef,
    pub count: u64,
}

impl WatchCountUpdate {
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(
            self.anime_name.trim(),
            self.season.trim(),
            self.language.as_str(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompletionUpdate {
    #[serde(flatten)]
    pub target: CompletionTarget,
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

/// Reply envelope. Only the fields relevant to the action are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<HistoryEntry>,
    /// Set on `SAVE_HISTORY` when the event matched an existing entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_status: Option<SeriesStatusTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_count: Option<WatchCountDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<PlanningData>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// `success: false` with no error text, for lookups that found nothing.
    pub fn not_found() -> Self {
        Self::default()
    }
}
