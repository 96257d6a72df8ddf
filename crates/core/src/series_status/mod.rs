//! Per-series progress: series → season → language → watched episodes.
//!
//! Completion flags are only ever set through [`SeriesStatusTree::set_completion`];
//! recording watches never infers completion, since the total episode count
//! of a season is usually unknown.

mod tree;
mod types;

pub use tree::SeriesStatusTree;
pub use types::{CompletionTarget, LanguageProgress, SeasonStatus, SeriesStatus};
