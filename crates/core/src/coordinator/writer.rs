use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use super::handle::Command;
use super::{CoordinatorHandle, Ingested, TrackerError, TrackerState};
use crate::event::{normalize, RawEvent};
use crate::history::Appended;
use crate::metrics;
use crate::series_status::CompletionTarget;
use crate::store::{write_with_retry, KvStore, RetryPolicy, StorageError};
use crate::watch_count::{EpisodeSlot, SeriesKey};

/// Background task owning the mutable [`TrackerState`].
pub struct Coordinator {
    rx: mpsc::Receiver<Command>,
    state: TrackerState,
    store: Arc<dyn KvStore>,
    retry: RetryPolicy,
    snapshot_tx: watch::Sender<Arc<TrackerState>>,
    /// Set while the store is behind the in-memory state.
    dirty: bool,
}

impl Coordinator {
    /// Apply commands until every handle is dropped, then flush anything
    /// still unsaved.
    ///
    /// Spawn with `tokio::spawn(coordinator.run())`.
    pub async fn run(mut self) {
        info!("Coordinator started");

        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Ingest { raw, reply } => {
                    let _ = reply.send(self.ingest(raw).await);
                }
                Command::CorrectCount {
                    key,
                    slot,
                    count,
                    reply,
                } => {
                    let _ = reply.send(self.correct_count(&key, slot, count).await);
                }
                Command::SetCompletion {
                    target,
                    completed,
                    reply,
                } => {
                    let _ = reply.send(self.set_completion(&target, completed).await);
                }
                Command::Reset { reply } => {
                    let _ = reply.send(self.reset().await);
                }
            }
        }

        if self.dirty {
            info!("Flushing unsaved state before shutdown");
            if let Err(e) = self.persist().await {
                error!("Final flush failed, recent changes are lost: {}", e);
            }
        }

        info!("Coordinator shutting down");
    }

    async fn ingest(&mut self, raw: RawEvent) -> Result<Ingested, TrackerError> {
        let now = Utc::now().timestamp_millis();

        let event = match normalize(raw, now) {
            Ok(event) => event,
            Err(e) => {
                metrics::EVENTS_INGESTED.with_label_values(&["rejected"]).inc();
                warn!("Viewing event rejected: {}", e);
                return Err(e.into());
            }
        };

        match self.state.history.append(event, now) {
            Appended::Duplicate(entry) => {
                metrics::EVENTS_INGESTED.with_label_values(&["duplicate"]).inc();
                if self.dirty {
                    self.persist().await?;
                }
                Ok(Ingested {
                    entry,
                    duplicate: true,
                })
            }
            Appended::Inserted(entry) => {
                self.state.watch_counts.record_watch(&entry.event);
                self.state.series_status.record_watch(&entry.event);
                self.publish();

                info!(
                    series = %entry.event.series_id,
                    season = %entry.event.season,
                    language = %entry.event.language,
                    episode = ?entry.event.episode,
                    "Viewing recorded"
                );

                if let Err(e) = self.persist().await {
                    metrics::EVENTS_INGESTED
                        .with_label_values(&["storage_error"])
                        .inc();
                    return Err(e.into());
                }
                metrics::EVENTS_INGESTED.with_label_values(&["recorded"]).inc();
                Ok(Ingested {
                    entry,
                    duplicate: false,
                })
            }
        }
    }

    async fn correct_count(
        &mut self,
        key: &SeriesKey,
        slot: EpisodeSlot,
        count: u64,
    ) -> Result<bool, TrackerError> {
        if !self.state.watch_counts.set_count(key, slot, count) {
            metrics::COUNT_CORRECTIONS
                .with_label_values(&["not_found"])
                .inc();
            debug!(series = %key, episode = %slot, "No counter to correct");
            return Ok(false);
        }

        self.publish();
        if let Err(e) = self.persist().await {
            metrics::COUNT_CORRECTIONS
                .with_label_values(&["storage_error"])
                .inc();
            return Err(e.into());
        }
        metrics::COUNT_CORRECTIONS.with_label_values(&["applied"]).inc();
        info!(series = %key, episode = %slot, count, "Watch count corrected");
        Ok(true)
    }

    async fn set_completion(
        &mut self,
        target: &CompletionTarget,
        completed: bool,
    ) -> Result<bool, TrackerError> {
        if !self.state.series_status.set_completion(target, completed) {
            debug!(?target, "No status bucket for completion flag");
            return Ok(false);
        }

        self.publish();
        self.persist().await?;
        info!(series = %target.series_id, completed, "Completion flag set");
        Ok(true)
    }

    async fn reset(&mut self) -> Result<(), TrackerError> {
        self.state.clear();
        self.publish();
        self.persist().await?;
        info!("Tracking data reset");
        Ok(())
    }

    fn publish(&mut self) {
        metrics::HISTORY_ENTRIES.set(self.state.history.len() as i64);
        self.snapshot_tx.send_replace(Arc::new(self.state.clone()));
    }

    /// Write all three documents in one store call.
    async fn persist(&mut self) -> Result<(), StorageError> {
        let result = match self.state.to_documents() {
            Ok(documents) => write_with_retry(self.store.as_ref(), documents, &self.retry).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                if self.dirty {
                    info!("Store caught up with in-memory state");
                }
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                Err(e)
            }
        }
    }
}

/// Create the coordinator pair.
///
/// Returns:
/// - `CoordinatorHandle` - clone this into every task that needs the tracker
/// - `Coordinator` - spawn this with `tokio::spawn(coordinator.run())`
pub fn create_coordinator(
    state: TrackerState,
    store: Arc<dyn KvStore>,
    retry: RetryPolicy,
    buffer_size: usize,
) -> (CoordinatorHandle, Coordinator) {
    let (tx, rx) = mpsc::channel(buffer_size.max(1));
    metrics::HISTORY_ENTRIES.set(state.history.len() as i64);
    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(state.clone()));

    let handle = CoordinatorHandle::new(tx, snapshot_rx);
    let coordinator = Coordinator {
        rx,
        state,
        store,
        retry,
        snapshot_tx,
        dirty: false,
    };
    (handle, coordinator)
}
