//! Weekly release planning: the data blob, its store and the periodic
//! refresh task.
//!
//! Planning is kept apart from viewing aggregation. It has its own store
//! lock and its own refresh loop, so a slow or failing source never holds
//! up ingestion.

mod source;
mod store;
mod sync;
mod types;

pub use source::{HttpPlanningSource, PlanningSource};
pub use store::PlanningStore;
pub use sync::{refresh_once, PlanningSync};
pub use types::{PlanningData, PlanningDay, PlanningItem, PlanningKind};

use thiserror::Error;

use crate::store::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("Planning fetch failed: {0}")]
    Fetch(String),

    #[error("Invalid planning data: {0}")]
    InvalidData(String),

    #[error("Planning storage failed: {0}")]
    Storage(#[from] StorageError),
}
