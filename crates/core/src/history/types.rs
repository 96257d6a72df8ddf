use serde::{Deserialize, Serialize};

use crate::event::EventRecord;

/// An event as stored in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(flatten)]
    pub event: EventRecord,
    /// When the log accepted the entry (epoch ms).
    pub recorded_at: i64,
}

/// Result of [`HistoryLog::append`](super::HistoryLog::append).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Appended {
    /// A new entry was created.
    Inserted(HistoryEntry),
    /// The event repeats an existing entry, which is returned untouched.
    Duplicate(HistoryEntry),
}

impl Appended {
    pub fn entry(&self) -> &HistoryEntry {
        match self {
            Appended::Inserted(entry) | Appended::Duplicate(entry) => entry,
        }
    }

    pub fn into_entry(self) -> HistoryEntry {
        match self {
            Appended::Inserted(entry) | Appended::Duplicate(entry) => entry,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Appended::Duplicate(_))
    }
}

/// Filter for querying the history log. All set fields must match.
///
/// Field names follow the message contract (`animeName`, `dateFrom`, ...).
/// Empty strings are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilter {
    /// Case-insensitive substring of the display title or series id.
    #[serde(default)]
    pub anime_name: Option<String>,
    /// Exact language match.
    #[serde(default)]
    pub language: Option<String>,
    /// Inclusive lower bound on `observedAt`.
    #[serde(default)]
    pub date_from: Option<i64>,
    /// Inclusive upper bound on `observedAt`.
    #[serde(default)]
    pub date_to: Option<i64>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anime_name(mut self, name: impl Into<String>) -> Self {
        self.anime_name = Some(name.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_time_range(mut self, from: Option<i64>, to: Option<i64>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Whether `entry` passes every set criterion.
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        let event = &entry.event;

        if let Some(name) = self.anime_name.as_deref().filter(|n| !n.is_empty()) {
            let needle = name.to_lowercase();
            let in_title = event.display_title.to_lowercase().contains(&needle);
            let in_id = event.series_id.to_lowercase().contains(&needle);
            if !in_title && !in_id {
                return false;
            }
        }

        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            if event.language != language {
                return false;
            }
        }

        if self.date_from.is_some_and(|from| event.observed_at < from) {
            return false;
        }

        if self.date_to.is_some_and(|to| event.observed_at > to) {
            return false;
        }

        true
    }
}
