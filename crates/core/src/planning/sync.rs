use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{PlanningData, PlanningError, PlanningSource, PlanningStore};
use crate::config::PlanningConfig;
use crate::metrics;

/// Fetch a fresh planning and store it.
pub async fn refresh_once(
    source: &dyn PlanningSource,
    store: &PlanningStore,
) -> Result<PlanningData, PlanningError> {
    let data = match source.fetch().await {
        Ok(data) => data,
        Err(e) => {
            metrics::PLANNING_REFRESHES
                .with_label_values(&["fetch_error"])
                .inc();
            return Err(e);
        }
    };

    if let Err(e) = store.save(&data).await {
        metrics::PLANNING_REFRESHES
            .with_label_values(&["storage_error"])
            .inc();
        return Err(e);
    }

    metrics::PLANNING_REFRESHES
        .with_label_values(&["success"])
        .inc();
    Ok(data)
}

/// Periodic planning refresh.
pub struct PlanningSync {
    source: Arc<dyn PlanningSource>,
    store: Arc<PlanningStore>,
    startup_delay: Duration,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl PlanningSync {
    pub fn new(
        source: Arc<dyn PlanningSource>,
        store: Arc<PlanningStore>,
        config: &PlanningConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            source,
            store,
            startup_delay: Duration::from_secs(config.startup_delay_secs),
            interval: Duration::from_secs(config.interval_secs),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Override the schedule. Mostly useful in tests.
    pub fn with_schedule(mut self, startup_delay: Duration, interval: Duration) -> Self {
        self.startup_delay = startup_delay;
        self.interval = interval;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Spawn the refresh loop. The first refresh runs after the startup
    /// delay, then once per interval.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Planning sync already running");
            return;
        }

        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        let running = Arc::clone(&self.running);
        let interval = self.interval;
        let mut delay = self.startup_delay;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Planning sync started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Planning sync received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        match refresh_once(source.as_ref(), &store).await {
                            Ok(data) => info!(items = data.item_count(), "Planning refreshed"),
                            Err(e) => warn!("Planning refresh failed: {}", e),
                        }
                        delay = interval;
                    }
                }
            }
            info!("Planning sync stopped");
        });
    }

    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Stopping planning sync");
        let _ = self.shutdown_tx.send(());
    }
}
