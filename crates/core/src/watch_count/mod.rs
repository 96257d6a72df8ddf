//! Replay counters per (series, season, language) and per episode.

mod document;
mod index;
mod types;

pub use document::{EpisodeWatchDocument, SeriesWatchDocument, WatchCountDocument};
pub use index::WatchCountIndex;
pub use types::{EpisodeSlot, EpisodeWatch, SeriesKey, SeriesWatch};
