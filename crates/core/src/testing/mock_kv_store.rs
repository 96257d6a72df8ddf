//! Mock key-value store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::store::{KvStore, StorageError};

/// In-memory [`KvStore`] with injectable write failures.
///
/// - `fail_next_sets(n)` makes the next `n` writes fail, then recover
/// - `set_failing(true)` makes every write fail until switched off
/// - every accepted write is recorded for assertions
///
/// # Example
///
/// ```rust,ignore
/// use animelog_core::testing::MockKvStore;
///
/// let store = MockKvStore::new();
/// store.fail_next_sets(2);
///
/// // ... exercise code that writes ...
///
/// assert_eq!(store.set_calls(), 3);
/// assert_eq!(store.recorded_writes().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockKvStore {
    values: Mutex<HashMap<String, Value>>,
    writes: Mutex<Vec<HashMap<String, Value>>>,
    set_calls: AtomicUsize,
    failures_left: AtomicU32,
    failing: AtomicBool,
}

impl MockKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` writes.
    pub fn fail_next_sets(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Fail every write while `failing` is true.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `set` calls, failed ones included.
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Every accepted write, oldest first.
    pub fn recorded_writes(&self) -> Vec<HashMap<String, Value>> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn should_fail(&self) -> bool {
        if self.failing.load(Ordering::SeqCst) {
            return true;
        }
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

impl KvStore for MockKvStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    fn set(&self, entries: HashMap<String, Value>) -> Result<(), StorageError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail() {
            return Err(StorageError::Unavailable("mock store failure".to_string()));
        }

        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entries.clone());
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(entries);
        Ok(())
    }
}
