use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::event::EventRecord;

/// Identifies one watch-count bucket: a series, season and language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub series_id: String,
    pub season: String,
    /// Uppercase, like [`EventRecord::language`].
    pub language: String,
}

impl SeriesKey {
    /// Build a key; the language is upper-cased so lookups match ingested events.
    pub fn new(
        series_id: impl Into<String>,
        season: impl Into<String>,
        language: impl AsRef<str>,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            season: season.into(),
            language: language.as_ref().trim().to_uppercase(),
        }
    }

    pub fn from_event(event: &EventRecord) -> Self {
        Self {
            series_id: event.series_id.clone(),
            season: event.season.clone(),
            language: event.language.clone(),
        }
    }

    /// Flat key used in the persisted document, e.g. `demon-slayer_s1_VOSTFR`.
    pub fn storage_key(&self) -> String {
        self.to_string()
    }

    /// Flat episode key, e.g. `demon-slayer_s1_VOSTFR_ep5`.
    pub fn episode_key(&self, slot: EpisodeSlot) -> String {
        format!("{}_ep{}", self, slot)
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.series_id, self.season, self.language)
    }
}

/// Episode position inside a series bucket.
///
/// Every watch whose episode number was not detected shares the single
/// `Unknown` slot of its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EpisodeSlot {
    Number(u32),
    Unknown,
}

impl EpisodeSlot {
    pub fn number(self) -> Option<u32> {
        match self {
            EpisodeSlot::Number(n) => Some(n),
            EpisodeSlot::Unknown => None,
        }
    }
}

impl From<Option<u32>> for EpisodeSlot {
    fn from(episode: Option<u32>) -> Self {
        episode.map_or(EpisodeSlot::Unknown, EpisodeSlot::Number)
    }
}

impl fmt::Display for EpisodeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeSlot::Number(n) => write!(f, "{}", n),
            EpisodeSlot::Unknown => f.write_str("unknown"),
        }
    }
}

/// Counter for one episode slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeWatch {
    pub count: u64,
    pub last_watched_at: Option<i64>,
    pub episode: Option<u32>,
    pub language: String,
}

/// Counters for one series bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesWatch {
    /// Always the sum of every episode count.
    pub total_watches: u64,
    pub last_watched_at: Option<i64>,
    pub episodes: BTreeMap<EpisodeSlot, EpisodeWatch>,
    pub languages_seen: BTreeSet<String>,
}

impl SeriesWatch {
    pub fn episode(&self, slot: EpisodeSlot) -> Option<&EpisodeWatch> {
        self.episodes.get(&slot)
    }

    /// Sum of the episode counters.
    pub fn counted_total(&self) -> u64 {
        self.episodes
            .values()
            .fold(0u64, |total, e| total.saturating_add(e.count))
    }
}
