//! Storage and wire form of the watch-count index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `"<series>_<season>_<LANG>"` → series counters.
pub type WatchCountDocument = BTreeMap<String, SeriesWatchDocument>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesWatchDocument {
    pub series_id: String,
    pub season: String,
    pub language: String,
    pub total_watches: u64,
    pub last_watched: Option<i64>,
    /// Languages seen, ascending.
    #[serde(default)]
    pub languages: Vec<String>,
    /// `"<seriesKey>_ep<n|unknown>"` → episode counter.
    #[serde(default)]
    pub episodes: BTreeMap<String, EpisodeWatchDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeWatchDocument {
    pub count: u64,
    pub last_watched: Option<i64>,
    pub episode: Option<u32>,
    pub language: String,
}
