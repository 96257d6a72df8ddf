use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use super::{TrackerError, TrackerState};
use crate::event::RawEvent;
use crate::history::{HistoryEntry, HistoryFilter};
use crate::series_status::{CompletionTarget, SeriesStatusTree};
use crate::watch_count::{EpisodeSlot, SeriesKey, SeriesWatch};

type Reply<T> = oneshot::Sender<Result<T, TrackerError>>;

/// Outcome of an accepted ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    /// The new entry, or the existing one the event duplicated.
    pub entry: HistoryEntry,
    pub duplicate: bool,
}

pub(crate) enum Command {
    Ingest {
        raw: RawEvent,
        reply: Reply<Ingested>,
    },
    CorrectCount {
        key: SeriesKey,
        slot: EpisodeSlot,
        count: u64,
        reply: Reply<bool>,
    },
    SetCompletion {
        target: CompletionTarget,
        completed: bool,
        reply: Reply<bool>,
    },
    Reset {
        reply: Reply<()>,
    },
}

/// Cheap, cloneable access to the coordinator.
///
/// Mutations are queued to the writer task and answered once the change is
/// applied and a write has been attempted. Reads never leave the caller: they
/// use the most recently published snapshot.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
    snapshot: watch::Receiver<Arc<TrackerState>>,
}

impl CoordinatorHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<Command>,
        snapshot: watch::Receiver<Arc<TrackerState>>,
    ) -> Self {
        Self { tx, snapshot }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, TrackerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| TrackerError::ShutDown)?;
        rx.await.map_err(|_| TrackerError::ShutDown)?
    }

    /// Validate and record one viewing event.
    pub async fn ingest(&self, raw: RawEvent) -> Result<Ingested, TrackerError> {
        self.request(|reply| Command::Ingest { raw, reply }).await
    }

    /// Overwrite an episode counter. `Ok(false)` when no such counter exists.
    pub async fn correct_count(
        &self,
        key: SeriesKey,
        slot: EpisodeSlot,
        count: u64,
    ) -> Result<bool, TrackerError> {
        self.request(|reply| Command::CorrectCount {
            key,
            slot,
            count,
            reply,
        })
        .await
    }

    /// Set or clear a completion flag. `Ok(false)` when the target is unknown.
    pub async fn set_completion(
        &self,
        target: CompletionTarget,
        completed: bool,
    ) -> Result<bool, TrackerError> {
        self.request(|reply| Command::SetCompletion {
            target,
            completed,
            reply,
        })
        .await
    }

    /// Clear all three structures.
    pub async fn reset(&self) -> Result<(), TrackerError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    /// The latest published state.
    pub fn snapshot(&self) -> Arc<TrackerState> {
        self.snapshot.borrow().clone()
    }

    pub fn query_history(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        self.snapshot().history().query(filter)
    }

    pub fn watch_count(&self, key: &SeriesKey) -> Option<SeriesWatch> {
        self.snapshot().watch_counts().get(key).cloned()
    }

    pub fn series_status(&self) -> SeriesStatusTree {
        self.snapshot().series_status().clone()
    }
}
