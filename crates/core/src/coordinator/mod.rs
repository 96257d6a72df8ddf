//! Aggregation coordinator: the only writer of the tracking structures.
//!
//! Commands are queued on a bounded channel and applied one at a time by
//! [`Coordinator::run`]. After each mutation the whole [`TrackerState`] is
//! published as a new snapshot, then the three documents are written to the
//! store together. Readers work on snapshots and never wait on the writer.

mod error;
mod handle;
mod state;
mod writer;

pub use error::TrackerError;
pub use handle::{CoordinatorHandle, Ingested};
pub use state::TrackerState;
pub use writer::{create_coordinator, Coordinator};
