use std::collections::VecDeque;

use tracing::debug;
use uuid::Uuid;

use super::{Appended, HistoryEntry, HistoryFilter};
use crate::config::HistoryConfig;
use crate::event::EventRecord;

/// In-memory history log. Index 0 is the most recent entry.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    policy: HistoryConfig,
}

impl HistoryLog {
    pub fn new(policy: HistoryConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            policy,
        }
    }

    /// Rebuild a log from persisted entries (most recent first).
    ///
    /// Entries beyond the capacity are dropped from the tail.
    pub fn from_entries(entries: Vec<HistoryEntry>, policy: HistoryConfig) -> Self {
        let mut entries = VecDeque::from(entries);
        entries.truncate(policy.capacity);
        Self { entries, policy }
    }

    pub fn policy(&self) -> HistoryConfig {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Find an entry recording the same viewing as `event`: same source URL,
    /// observed less than the dedup window apart. Events without a URL never
    /// match.
    pub fn find_duplicate(&self, event: &EventRecord) -> Option<&HistoryEntry> {
        if event.source_url.is_empty() {
            return None;
        }
        let window = u64::try_from(self.policy.dedup_window_ms).unwrap_or(0);
        self.entries.iter().find(|entry| {
            entry.event.source_url == event.source_url
                && entry.event.observed_at.abs_diff(event.observed_at) < window
        })
    }

    /// Append an event unless it duplicates an existing entry.
    pub fn append(&mut self, event: EventRecord, now_ms: i64) -> Appended {
        if let Some(existing) = self.find_duplicate(&event) {
            debug!(
                entry_id = %existing.id,
                source_url = %event.source_url,
                "Duplicate viewing event ignored"
            );
            return Appended::Duplicate(existing.clone());
        }

        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            event,
            recorded_at: now_ms,
        };

        self.entries.push_front(entry.clone());
        if self.entries.len() > self.policy.capacity {
            let evicted = self.entries.len() - self.policy.capacity;
            self.entries.truncate(self.policy.capacity);
            debug!(evicted, "History capacity reached, oldest entries evicted");
        }

        Appended::Inserted(entry)
    }

    /// Entries matching `filter`, most recent first.
    pub fn query(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    /// Persisted form: the entry list, most recent first.
    pub fn to_document(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}
