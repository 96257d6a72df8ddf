use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, warn};

use super::{KvStore, StorageError};
use crate::config::PersistenceConfig;
use crate::metrics;

/// Bounded retry with exponential backoff for store writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        PersistenceConfig::default().into()
    }
}

impl From<PersistenceConfig> for RetryPolicy {
    fn from(config: PersistenceConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        }
    }
}

/// Write `entries` in one `set` call, retrying up to the policy's limit.
///
/// Returns the last error once every attempt has failed.
pub async fn write_with_retry(
    store: &dyn KvStore,
    entries: HashMap<String, Value>,
    policy: &RetryPolicy,
) -> Result<(), StorageError> {
    let attempts = policy.max_attempts.max(1);
    let mut backoff = policy.initial_backoff;
    let mut attempt = 1;

    loop {
        metrics::PERSIST_ATTEMPTS.inc();
        match store.set(entries.clone()) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < attempts => {
                warn!(
                    attempt,
                    max_attempts = attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    "Store write failed, retrying: {}",
                    e
                );
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => {
                metrics::PERSIST_FAILURES.inc();
                error!(attempts, "Store write failed: {}", e);
                return Err(e);
            }
        }
    }
}
