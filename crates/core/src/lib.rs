pub mod config;
pub mod coordinator;
pub mod event;
pub mod history;
pub mod message;
pub mod metrics;
pub mod planning;
pub mod series_status;
pub mod store;
pub mod testing;
pub mod watch_count;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    HistoryConfig, PersistenceConfig, PlanningConfig, ServerConfig,
};
pub use coordinator::{
    create_coordinator, Coordinator, CoordinatorHandle, Ingested, TrackerError, TrackerState,
};
pub use event::{normalize, EventRecord, RawEvent, ValidationError};
pub use history::{Appended, HistoryEntry, HistoryFilter, HistoryLog};
pub use message::{MessageRouter, Request, Response};
pub use planning::{
    HttpPlanningSource, PlanningData, PlanningError, PlanningSource, PlanningStore, PlanningSync,
};
pub use series_status::{CompletionTarget, SeriesStatus, SeriesStatusTree};
pub use store::{KvStore, MemoryKvStore, RetryPolicy, SqliteKvStore, StorageError};
pub use watch_count::{EpisodeSlot, SeriesKey, SeriesWatch, WatchCountIndex};
