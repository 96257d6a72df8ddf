use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use super::{PlanningData, PlanningError};
use crate::store::{keys, write_with_retry, KvStore, RetryPolicy};

/// Reads and writes the planning blob.
///
/// Writers serialize on their own lock, independent of the coordinator.
pub struct PlanningStore {
    store: Arc<dyn KvStore>,
    retry: RetryPolicy,
    write_lock: Mutex<()>,
}

impl PlanningStore {
    pub fn new(store: Arc<dyn KvStore>, retry: RetryPolicy) -> Self {
        Self {
            store,
            retry,
            write_lock: Mutex::new(()),
        }
    }

    /// Replace the stored planning with `data`.
    pub async fn save(&self, data: &PlanningData) -> Result<(), PlanningError> {
        data.validate()?;
        let value = serde_json::to_value(data)
            .map_err(|e| PlanningError::InvalidData(e.to_string()))?;

        let _guard = self.write_lock.lock().await;
        write_with_retry(
            self.store.as_ref(),
            HashMap::from([(keys::PLANNING.to_string(), value)]),
            &self.retry,
        )
        .await?;

        info!(items = data.item_count(), "Planning saved");
        Ok(())
    }

    /// The stored planning, or `None` if nothing was ever saved.
    pub fn load(&self) -> Result<Option<PlanningData>, PlanningError> {
        let mut values = self.store.get(&[keys::PLANNING])?;
        match values.remove(keys::PLANNING) {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| PlanningError::InvalidData(e.to_string())),
            None => Ok(None),
        }
    }
}
