//! Bounded, deduplicated ledger of viewing events (most recent first).

mod log;
mod types;

pub use log::HistoryLog;
pub use types::{Appended, HistoryEntry, HistoryFilter};
