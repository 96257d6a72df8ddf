use thiserror::Error;

use crate::event::ValidationError;
use crate::store::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The raw event was rejected before anything was touched.
    #[error("Invalid event: {0}")]
    Validation(#[from] ValidationError),

    /// In-memory state advanced but could not be written durably.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    /// The writer task is gone.
    #[error("Tracker is shut down")]
    ShutDown,
}
