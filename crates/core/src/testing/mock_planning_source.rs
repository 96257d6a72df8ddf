//! Mock planning source for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::planning::{PlanningData, PlanningError, PlanningSource};

/// [`PlanningSource`] returning a configured response.
///
/// Returns an empty planning until told otherwise.
#[derive(Debug)]
pub struct MockPlanningSource {
    response: Mutex<Result<PlanningData, PlanningError>>,
    fetches: AtomicUsize,
}

impl Default for MockPlanningSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlanningSource {
    pub fn new() -> Self {
        Self {
            response: Mutex::new(Ok(PlanningData::default())),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Set what every following fetch returns.
    pub fn set_response(&self, response: Result<PlanningData, PlanningError>) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = response;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanningSource for MockPlanningSource {
    async fn fetch(&self) -> Result<PlanningData, PlanningError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
