use std::collections::HashMap;

use serde_json::Value;
use tracing::info;

use crate::config::HistoryConfig;
use crate::history::{HistoryEntry, HistoryLog};
use crate::series_status::SeriesStatusTree;
use crate::store::{keys, KvStore, StorageError};
use crate::watch_count::{WatchCountDocument, WatchCountIndex};

/// The three derived structures, always read and written together.
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    pub(crate) history: HistoryLog,
    pub(crate) watch_counts: WatchCountIndex,
    pub(crate) series_status: SeriesStatusTree,
}

impl TrackerState {
    /// Empty state with the given history policy.
    pub fn new(policy: HistoryConfig) -> Self {
        Self {
            history: HistoryLog::new(policy),
            watch_counts: WatchCountIndex::new(),
            series_status: SeriesStatusTree::new(),
        }
    }

    /// Load persisted state; missing documents start empty.
    pub fn load(store: &dyn KvStore, policy: HistoryConfig) -> Result<Self, StorageError> {
        let mut values = store.get(&[keys::HISTORY, keys::WATCH_COUNT, keys::SERIES_STATUS])?;

        let history = match values.remove(keys::HISTORY) {
            Some(value) => {
                let entries: Vec<HistoryEntry> = serde_json::from_value(value)?;
                HistoryLog::from_entries(entries, policy)
            }
            None => HistoryLog::new(policy),
        };

        let watch_counts = match values.remove(keys::WATCH_COUNT) {
            Some(value) => {
                let document: WatchCountDocument = serde_json::from_value(value)?;
                WatchCountIndex::from_document(document)
            }
            None => WatchCountIndex::new(),
        };

        let series_status = match values.remove(keys::SERIES_STATUS) {
            Some(value) => {
                let mut tree: SeriesStatusTree = serde_json::from_value(value)?;
                tree.repair_last_episodes();
                tree
            }
            None => SeriesStatusTree::new(),
        };

        info!(
            history_entries = history.len(),
            series_buckets = watch_counts.len(),
            series = series_status.len(),
            "Tracker state loaded"
        );

        Ok(Self {
            history,
            watch_counts,
            series_status,
        })
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn watch_counts(&self) -> &WatchCountIndex {
        &self.watch_counts
    }

    pub fn series_status(&self) -> &SeriesStatusTree {
        &self.series_status
    }

    /// The three documents as written to the store.
    pub fn to_documents(&self) -> Result<HashMap<String, Value>, StorageError> {
        Ok(HashMap::from([
            (
                keys::HISTORY.to_string(),
                serde_json::to_value(self.history.to_document())?,
            ),
            (
                keys::WATCH_COUNT.to_string(),
                serde_json::to_value(self.watch_counts.to_document())?,
            ),
            (
                keys::SERIES_STATUS.to_string(),
                serde_json::to_value(&self.series_status)?,
            ),
        ]))
    }

    pub(crate) fn clear(&mut self) {
        self.history.clear();
        self.watch_counts.clear();
        self.series_status.clear();
    }
}
