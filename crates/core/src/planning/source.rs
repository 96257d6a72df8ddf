use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{PlanningData, PlanningError};

/// Somewhere a fresh weekly planning can be fetched from.
#[async_trait]
pub trait PlanningSource: Send + Sync {
    async fn fetch(&self) -> Result<PlanningData, PlanningError>;
}

/// Fetches the planning blob as JSON over HTTP.
pub struct HttpPlanningSource {
    http_client: Client,
    url: String,
}

impl HttpPlanningSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PlanningError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlanningError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl PlanningSource for HttpPlanningSource {
    async fn fetch(&self) -> Result<PlanningData, PlanningError> {
        debug!(url = %self.url, "Fetching planning");

        let response = self.http_client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                PlanningError::Fetch("request timed out".to_string())
            } else {
                PlanningError::Fetch(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(PlanningError::Fetch(format!("HTTP {}", response.status())));
        }

        let data: PlanningData = response
            .json()
            .await
            .map_err(|e| PlanningError::InvalidData(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }
}
