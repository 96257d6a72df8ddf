use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionTarget, SeriesStatus};
use crate::event::EventRecord;

/// Series id → status. Serializes as a plain map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesStatusTree {
    series: BTreeMap<String, SeriesStatus>,
}

impl SeriesStatusTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, series_id: &str) -> Option<&SeriesStatus> {
        self.series.get(series_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SeriesStatus)> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    /// Record one viewing: create missing buckets, add the episode, refresh
    /// the series timestamp. Never sets completion flags.
    pub fn record_watch(&mut self, event: &EventRecord) {
        let series = self
            .series
            .entry(event.series_id.clone())
            .or_insert_with(|| SeriesStatus {
                display_name: event.display_title.clone(),
                seasons: BTreeMap::new(),
                last_updated_at: event.observed_at,
                is_completed: false,
                total_episodes: None,
            });

        let progress = series
            .seasons
            .entry(event.season.clone())
            .or_default()
            .languages
            .entry(event.language.clone())
            .or_default();

        if let Some(episode) = event.episode {
            progress.add_episode(episode);
        }

        series.last_updated_at = event.observed_at;
    }

    /// Assert or clear a completion flag. Returns false when the target
    /// bucket does not exist.
    pub fn set_completion(&mut self, target: &CompletionTarget, completed: bool) -> bool {
        let Some(series) = self.series.get_mut(&target.series_id) else {
            return false;
        };

        let flag = match (&target.season, &target.language) {
            (None, None) => &mut series.is_completed,
            (None, Some(_)) => return false,
            (Some(season), language) => {
                let Some(season_status) = series.seasons.get_mut(season) else {
                    return false;
                };
                match language {
                    None => &mut season_status.is_completed,
                    Some(language) => {
                        let language = language.trim().to_uppercase();
                        match season_status.languages.get_mut(&language) {
                            Some(progress) => &mut progress.is_completed,
                            None => return false,
                        }
                    }
                }
            }
        };

        *flag = completed;
        debug!(?target, completed, "Completion flag updated");
        true
    }

    /// Re-derive `last_episode` from the watched set everywhere. Used after
    /// loading a document that may have been written by another tool.
    pub fn repair_last_episodes(&mut self) {
        for series in self.series.values_mut() {
            for season in series.seasons.values_mut() {
                for progress in season.languages.values_mut() {
                    progress.last_episode = progress.watched_episodes.iter().next_back().copied();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series_status::LanguageProgress;

    fn event(episode: Option<u32>, observed_at: i64) -> EventRecord {
        EventRecord {
            series_id: "demon-slayer".to_string(),
            display_title: "Demon Slayer".to_string(),
            season: "s1".to_string(),
            language: "VOSTFR".to_string(),
            episode,
            source_url: format!("https://x/{observed_at}"),
            observed_at,
            watch_duration_ms: None,
        }
    }

    fn progress(tree: &SeriesStatusTree) -> &LanguageProgress {
        &tree.get("demon-slayer").unwrap().seasons["s1"].languages["VOSTFR"]
    }

    #[test]
    fn test_record_watch_builds_nested_buckets() {
        let mut tree = SeriesStatusTree::new();
        tree.record_watch(&event(Some(5), 1000));

        let series = tree.get("demon-slayer").unwrap();
        assert_eq!(series.display_name, "Demon Slayer");
        assert_eq!(series.last_updated_at, 1000);
        assert!(!series.is_completed);

        let p = progress(&tree);
        assert_eq!(p.watched_episodes.iter().copied().collect::<Vec<_>>(), vec![5]);
        assert_eq!(p.last_episode, Some(5));
        assert!(!p.is_completed);
    }

    #[test]
    fn test_last_episode_tracks_maximum() {
        let mut tree = SeriesStatusTree::new();
        tree.record_watch(&event(Some(6), 1));
        tree.record_watch(&event(Some(2), 2));
        tree.record_watch(&event(Some(4), 3));

        let p = progress(&tree);
        assert_eq!(p.last_episode, Some(6));
        assert_eq!(p.watched_episodes.len(), 3);
        assert_eq!(tree.get("demon-slayer").unwrap().last_updated_at, 3);
    }

    #[test]
    fn test_unknown_episode_creates_bucket_without_episodes() {
        let mut tree = SeriesStatusTree::new();
        tree.record_watch(&event(None, 7));

        let p = progress(&tree);
        assert!(p.watched_episodes.is_empty());
        assert_eq!(p.last_episode, None);
        assert_eq!(tree.get("demon-slayer").unwrap().last_updated_at, 7);
    }

    #[test]
    fn test_record_watch_never_completes() {
        let mut tree = SeriesStatusTree::new();
        for ep in 1..=24 {
            tree.record_watch(&event(Some(ep), ep as i64));
        }
        let series = tree.get("demon-slayer").unwrap();
        assert!(!series.is_completed);
        assert!(!series.seasons["s1"].is_completed);
        assert!(!progress(&tree).is_completed);
    }

    #[test]
    fn test_set_completion_targets() {
        let mut tree = SeriesStatusTree::new();
        tree.record_watch(&event(Some(1), 1));

        assert!(tree.set_completion(&CompletionTarget::language("demon-slayer", "s1", "vostfr"), true));
        assert!(progress(&tree).is_completed);

        assert!(tree.set_completion(&CompletionTarget::season("demon-slayer", "s1"), true));
        assert!(tree.get("demon-slayer").unwrap().seasons["s1"].is_completed);

        assert!(tree.set_completion(&CompletionTarget::series("demon-slayer"), true));
        assert!(tree.get("demon-slayer").unwrap().is_completed);

        assert!(tree.set_completion(&CompletionTarget::series("demon-slayer"), false));
        assert!(!tree.get("demon-slayer").unwrap().is_completed);
    }

    #[test]
    fn test_set_completion_missing_targets() {
        let mut tree = SeriesStatusTree::new();
        tree.record_watch(&event(Some(1), 1));
        let before = tree.clone();

        assert!(!tree.set_completion(&CompletionTarget::series("one-piece"), true));
        assert!(!tree.set_completion(&CompletionTarget::season("demon-slayer", "s2"), true));
        assert!(!tree.set_completion(&CompletionTarget::language("demon-slayer", "s1", "VF"), true));
        let language_only = CompletionTarget {
            series_id: "demon-slayer".to_string(),
            season: None,
            language: Some("VOSTFR".to_string()),
        };
        assert!(!tree.set_completion(&language_only, true));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_serialized_shape() {
        let mut tree = SeriesStatusTree::new();
        tree.record_watch(&event(Some(6), 1));
        tree.record_watch(&event(Some(5), 2));

        let value = serde_json::to_value(&tree).unwrap();
        let lang = &value["demon-slayer"]["seasons"]["s1"]["languages"]["VOSTFR"];
        assert_eq!(lang["watchedEpisodes"], serde_json::json!([5, 6]));
        assert_eq!(lang["lastEpisode"], 6);
        assert_eq!(lang["isCompleted"], false);
        assert_eq!(value["demon-slayer"]["displayName"], "Demon Slayer");
        assert_eq!(value["demon-slayer"]["lastUpdatedAt"], 2);
    }

    #[test]
    fn test_repair_last_episodes() {
        let mut tree: SeriesStatusTree = serde_json::from_value(serde_json::json!({
            "demon-slayer": {
                "displayName": "Demon Slayer",
                "lastUpdatedAt": 1,
                "seasons": {
                    "s1": { "languages": { "VF": { "watchedEpisodes": [3, 1, 8], "lastEpisode": 2 } } }
                }
            }
        }))
        .unwrap();

        tree.repair_last_episodes();
        let p = &tree.get("demon-slayer").unwrap().seasons["s1"].languages["VF"];
        assert_eq!(p.last_episode, Some(8));
    }

    #[test]
    fn test_repair_clears_stale_last_episode() {
        let mut tree: SeriesStatusTree = serde_json::from_value(serde_json::json!({
            "demon-slayer": {
                "displayName": "Demon Slayer",
                "lastUpdatedAt": 1,
                "seasons": {
                    "s1": { "languages": { "VF": { "watchedEpisodes": [], "lastEpisode": 4 } } }
                }
            }
        }))
        .unwrap();

        tree.repair_last_episodes();
        let p = &tree.get("demon-slayer").unwrap().seasons["s1"].languages["VF"];
        assert_eq!(p.last_episode, None);
    }
}
