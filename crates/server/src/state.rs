use std::sync::Arc;

use animelog_core::{Config, CoordinatorHandle, MessageRouter, PlanningStore};

/// Shared application state
pub struct AppState {
    config: Config,
    coordinator: CoordinatorHandle,
    planning: Arc<PlanningStore>,
    messages: MessageRouter,
}

impl AppState {
    pub fn new(config: Config, coordinator: CoordinatorHandle, planning: Arc<PlanningStore>) -> Self {
        let messages = MessageRouter::new(coordinator.clone(), Arc::clone(&planning));
        Self {
            config,
            coordinator,
            planning,
            messages,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn coordinator(&self) -> &CoordinatorHandle {
        &self.coordinator
    }

    pub fn planning(&self) -> &PlanningStore {
        &self.planning
    }

    pub fn messages(&self) -> &MessageRouter {
        &self.messages
    }
}
