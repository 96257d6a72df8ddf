//! Viewing events: the raw observation handed over by a page extractor and
//! the canonical record every derived structure is built from.

mod normalize;
mod types;

pub use normalize::{normalize, ValidationError};
pub use types::{EventRecord, RawEvent};
