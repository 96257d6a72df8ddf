use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Progress for one language of one season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProgress {
    /// Serialized as an ascending array.
    #[serde(default)]
    pub watched_episodes: BTreeSet<u32>,
    /// Highest watched episode, `None` while nothing numbered was watched.
    #[serde(default)]
    pub last_episode: Option<u32>,
    #[serde(default)]
    pub is_completed: bool,
}

impl LanguageProgress {
    pub fn add_episode(&mut self, episode: u32) {
        self.watched_episodes.insert(episode);
        self.last_episode = Some(self.last_episode.map_or(episode, |last| last.max(episode)));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatus {
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageProgress>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatus {
    pub display_name: String,
    #[serde(default)]
    pub seasons: BTreeMap<String, SeasonStatus>,
    /// Observation time of the latest recorded watch (epoch ms).
    pub last_updated_at: i64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub total_episodes: Option<u32>,
}

/// Which completion flag an external assertion addresses.
///
/// No season targets the series itself; a language requires a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionTarget {
    #[serde(alias = "animeName")]
    pub series_id: String,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl CompletionTarget {
    pub fn series(series_id: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            season: None,
            language: None,
        }
    }

    pub fn season(series_id: impl Into<String>, season: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            season: Some(season.into()),
            language: None,
        }
    }

    pub fn language(
        series_id: impl Into<String>,
        season: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            season: Some(season.into()),
            language: Some(language.into()),
        }
    }
}
