use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PlanningError;

/// Highest day index; days run 0 (Sunday) to 6.
pub const LAST_DAY: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanningKind {
    Anime,
    Scan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "type")]
    pub kind: PlanningKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningDay {
    #[serde(default)]
    pub animes: Vec<PlanningItem>,
    #[serde(default)]
    pub scans: Vec<PlanningItem>,
}

/// Release schedule for one week, keyed by day index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningData {
    /// Epoch milliseconds of the scrape.
    #[serde(default)]
    pub last_updated: i64,
    #[serde(default)]
    pub days: BTreeMap<u8, PlanningDay>,
}

impl PlanningData {
    pub fn validate(&self) -> Result<(), PlanningError> {
        if let Some(day) = self.days.keys().find(|day| **day > LAST_DAY) {
            return Err(PlanningError::InvalidData(format!(
                "day {} is outside 0..={}",
                day, LAST_DAY
            )));
        }
        Ok(())
    }

    pub fn item_count(&self) -> usize {
        self.days
            .values()
            .map(|day| day.animes.len() + day.scans.len())
            .sum()
    }
}
