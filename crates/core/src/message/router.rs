use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::{Request, Response};
use crate::coordinator::CoordinatorHandle;
use crate::planning::PlanningStore;

/// Dispatches contract messages to the coordinator and the planning store.
#[derive(Clone)]
pub struct MessageRouter {
    coordinator: CoordinatorHandle,
    planning: Arc<PlanningStore>,
}

impl MessageRouter {
    pub fn new(coordinator: CoordinatorHandle, planning: Arc<PlanningStore>) -> Self {
        Self {
            coordinator,
            planning,
        }
    }

    /// Handle one raw JSON message.
    pub async fn handle(&self, message: Value) -> Response {
        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                debug!("Malformed message: {}", e);
                Response::failure(format!("invalid message: {}", e))
            }
        }
    }

    pub async fn dispatch(&self, request: Request) -> Response {
        debug!(action = request.action(), "Handling message");

        let response = match request {
            Request::SaveHistory { data } => match self.coordinator.ingest(data).await {
                Ok(ingested) => Response {
                    success: true,
                    entry: Some(ingested.entry),
                    duplicate: Some(ingested.duplicate),
                    ..Default::default()
                },
                Err(e) => Response::failure(e.to_string()),
            },

            Request::GetHistory { filters } => Response {
                success: true,
                history: Some(self.coordinator.query_history(&filters)),
                ..Default::default()
            },

            Request::UpdateWatchCount { data } => {
                let Some(slot) = data.episode.to_slot() else {
                    return Response::failure(
                        "invalid message: episode must be a number or \"unknown\"",
                    );
                };
                match self
                    .coordinator
                    .correct_count(data.key(), slot, data.count)
                    .await
                {
                    Ok(true) => Response::ok(),
                    Ok(false) => Response::not_found(),
                    Err(e) => Response::failure(e.to_string()),
                }
            }

            Request::GetSeriesStatus => Response {
                success: true,
                series_status: Some(self.coordinator.series_status()),
                ..Default::default()
            },

            Request::GetWatchCount => Response {
                success: true,
                watch_count: Some(self.coordinator.snapshot().watch_counts().to_document()),
                ..Default::default()
            },

            Request::SavePlanningData { data } => match self.planning.save(&data).await {
                Ok(()) => Response::ok(),
                Err(e) => Response::failure(e.to_string()),
            },

            Request::GetPlanningData => match self.planning.load() {
                Ok(planning) => Response {
                    success: true,
                    planning: Some(planning.unwrap_or_default()),
                    ..Default::default()
                },
                Err(e) => Response::failure(e.to_string()),
            },

            Request::SetCompletion { data } => {
                match self
                    .coordinator
                    .set_completion(data.target, data.completed)
                    .await
                {
                    Ok(true) => Response::ok(),
                    Ok(false) => Response::not_found(),
                    Err(e) => Response::failure(e.to_string()),
                }
            }

            Request::ResetTracking => match self.coordinator.reset().await {
                Ok(()) => Response::ok(),
                Err(e) => Response::failure(e.to_string()),
            },

            Request::Unknown => Response::failure("unknown action"),
        };

        if let Some(error) = &response.error {
            warn!("Message failed: {}", error);
        }
        response
    }
}
