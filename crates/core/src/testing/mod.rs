//! Mock implementations for tests.
//!
//! Both mocks are synchronous under the hood, so failures can be toggled
//! from test code without awaiting.
//!
//! # Example
//!
//! ```rust,ignore
//! use animelog_core::testing::{MockKvStore, MockPlanningSource};
//!
//! let store = Arc::new(MockKvStore::new());
//! store.set_failing(true);
//!
//! let source = MockPlanningSource::new();
//! source.set_response(Err(PlanningError::Fetch("HTTP 503".into())));
//! ```

mod mock_kv_store;
mod mock_planning_source;

pub use mock_kv_store::MockKvStore;
pub use mock_planning_source::MockPlanningSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::event::RawEvent;

    /// A raw event as the page extractor would send it.
    pub fn raw_event(
        series_id: &str,
        season: &str,
        language: &str,
        episode: Option<u32>,
        observed_at: i64,
    ) -> RawEvent {
        let slot = episode.map_or_else(|| "film".to_string(), |ep| ep.to_string());
        RawEvent {
            series_id: Some(series_id.to_string()),
            display_title: Some(series_id.replace('-', " ")),
            season: Some(season.to_string()),
            language: Some(language.to_string()),
            episode: episode.map(|ep| json!(ep)),
            source_url: Some(format!(
                "https://anime-sama.fr/catalogue/{}/{}/{}/{}",
                series_id,
                season,
                language.to_lowercase(),
                slot
            )),
            observed_at: Some(observed_at),
            watch_duration_ms: Some(1_200_000),
        }
    }
}
