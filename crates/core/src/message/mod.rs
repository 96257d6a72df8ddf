//! The request/response message contract.
//!
//! A message is a JSON object tagged by `action`. [`MessageRouter`] turns
//! one into a [`Response`] envelope; it never fails outright, every problem
//! becomes `success: false` with an `error` text.

mod router;
mod types;

pub use router::MessageRouter;
pub use types::{CompletionUpdate, EpisodeRef, Request, Response, WatchCountUpdate};
