use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{
    EpisodeSlot, EpisodeWatch, EpisodeWatchDocument, SeriesKey, SeriesWatch,
    SeriesWatchDocument, WatchCountDocument,
};
use crate::event::EventRecord;

/// Watch counts keyed by [`SeriesKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchCountIndex {
    series: BTreeMap<SeriesKey, SeriesWatch>,
}

impl WatchCountIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&SeriesWatch> {
        self.series.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesKey, &SeriesWatch)> {
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

    /// Count one viewing of `event`.
    pub fn record_watch(&mut self, event: &EventRecord) {
        let key = SeriesKey::from_event(event);
        let slot = EpisodeSlot::from(event.episode);

        let bucket = self.series.entry(key).or_default();
        let episode = bucket.episodes.entry(slot).or_insert_with(|| EpisodeWatch {
            count: 0,
            last_watched_at: None,
            episode: event.episode,
            language: event.language.clone(),
        });

        episode.count = episode.count.saturating_add(1);
        episode.last_watched_at = Some(event.observed_at);
        bucket.total_watches = bucket.total_watches.saturating_add(1);
        bucket.last_watched_at = Some(event.observed_at);
        bucket.languages_seen.insert(event.language.clone());
    }

    /// Overwrite one episode counter, keeping the series total in step.
    ///
    /// Returns false, without touching anything, when the bucket or the
    /// episode slot does not exist, or when the new total would not fit.
    pub fn set_count(&mut self, key: &SeriesKey, slot: EpisodeSlot, new_count: u64) -> bool {
        let Some(bucket) = self.series.get_mut(key) else {
            return false;
        };
        let Some(old_count) = bucket.episodes.get(&slot).map(|e| e.count) else {
            return false;
        };

        let total = bucket
            .episodes
            .iter()
            .filter(|(other, _)| **other != slot)
            .try_fold(new_count, |total, (_, e)| total.checked_add(e.count));
        let Some(total) = total else {
            warn!(
                series = %key,
                episode = %slot,
                new_count,
                "Watch count correction overflows the series total, ignoring"
            );
            return false;
        };

        if let Some(episode) = bucket.episodes.get_mut(&slot) {
            episode.count = new_count;
        }
        bucket.total_watches = total;

        debug!(
            series = %key,
            episode = %slot,
            old_count,
            new_count,
            "Watch count corrected"
        );
        true
    }

    /// Persisted form keyed by the flat series key.
    pub fn to_document(&self) -> WatchCountDocument {
        self.series
            .iter()
            .map(|(key, watch)| {
                let episodes = watch
                    .episodes
                    .iter()
                    .map(|(slot, episode)| {
                        (
                            key.episode_key(*slot),
                            EpisodeWatchDocument {
                                count: episode.count,
                                last_watched: episode.last_watched_at,
                                episode: episode.episode,
                                language: episode.language.clone(),
                            },
                        )
                    })
                    .collect();

                (
                    key.storage_key(),
                    SeriesWatchDocument {
                        series_id: key.series_id.clone(),
                        season: key.season.clone(),
                        language: key.language.clone(),
                        total_watches: watch.total_watches,
                        last_watched: watch.last_watched_at,
                        languages: watch.languages_seen.iter().cloned().collect(),
                        episodes,
                    },
                )
            })
            .collect()
    }

    /// Rebuild the index from its persisted form.
    ///
    /// Keys are taken from the fields embedded in each document. Series
    /// totals are recomputed from the episode counters.
    pub fn from_document(document: WatchCountDocument) -> Self {
        let mut series = BTreeMap::new();

        for (storage_key, doc) in document {
            let key = SeriesKey::new(doc.series_id, doc.season, &doc.language);
            let mut watch = SeriesWatch {
                total_watches: 0,
                last_watched_at: doc.last_watched,
                episodes: BTreeMap::new(),
                languages_seen: doc.languages.into_iter().collect(),
            };

            for episode in doc.episodes.into_values() {
                let slot = EpisodeSlot::from(episode.episode);
                watch.episodes.insert(
                    slot,
                    EpisodeWatch {
                        count: episode.count,
                        last_watched_at: episode.last_watched,
                        episode: episode.episode,
                        language: episode.language,
                    },
                );
            }

            watch.total_watches = watch.counted_total();
            if watch.total_watches != doc.total_watches {
                warn!(
                    series = %storage_key,
                    stored = doc.total_watches,
                    counted = watch.total_watches,
                    "Stored total disagrees with episode counts, using counted total"
                );
            }

            series.insert(key, watch);
        }

        Self { series }
    }
}
