use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A viewing observation as reported by the page extractor.
///
/// Field names follow the extractor's message payload; the older names
/// (`animeName`, `url`, `timestamp`, `watchDuration`) are accepted as
/// aliases. Nothing here is trusted until it goes through [`normalize`].
///
/// [`normalize`]: super::normalize
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, alias = "animeName")]
    pub series_id: Option<String>,
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Number or numeric string; anything else is treated as undetected.
    #[serde(default)]
    pub episode: Option<Value>,
    #[serde(default, alias = "url")]
    pub source_url: Option<String>,
    #[serde(default, alias = "timestamp")]
    pub observed_at: Option<i64>,
    #[serde(default, alias = "watchDuration")]
    pub watch_duration_ms: Option<u64>,
}

/// A validated viewing event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Canonical series slug.
    pub series_id: String,
    pub display_title: String,
    /// Opaque season token, e.g. "saison1" or "film".
    pub season: String,
    /// Always uppercase ("VOSTFR", "VF").
    pub language: String,
    /// Positive episode number, `None` when the extractor could not tell.
    pub episode: Option<u32>,
    /// Origin locator, used for deduplication.
    pub source_url: String,
    /// Epoch milliseconds.
    pub observed_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_duration_ms: Option<u64>,
}
