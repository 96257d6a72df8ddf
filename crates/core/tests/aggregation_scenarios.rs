//! End-to-end aggregation scenarios.
//!
//! These drive the coordinator the way the message boundary does and check
//! the log, the watch-count index and the status tree together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio_test::{assert_err, assert_ok};

use animelog_core::{
    create_coordinator, store::keys, testing::MockKvStore, CoordinatorHandle, EpisodeSlot,
    HistoryConfig, HistoryFilter, HistoryLog, KvStore, RawEvent, RetryPolicy, SeriesKey,
    SqliteKvStore, TrackerError, TrackerState,
};

fn retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
    }
}

fn start(state: TrackerState, store: Arc<dyn KvStore>) -> (CoordinatorHandle, JoinHandle<()>) {
    let (handle, coordinator) = create_coordinator(state, store, retry(), 32);
    (handle, tokio::spawn(coordinator.run()))
}

fn demon_slayer(episode: u32, url: &str, observed_at: i64) -> RawEvent {
    serde_json::from_value(json!({
        "seriesId": "demon-slayer",
        "season": "s1",
        "language": "vostfr",
        "episode": episode,
        "sourceUrl": url,
        "observedAt": observed_at
    }))
    .expect("valid raw event")
}

fn key() -> SeriesKey {
    SeriesKey::new("demon-slayer", "s1", "VOSTFR")
}

fn assert_invariants(handle: &CoordinatorHandle) {
    let snapshot = handle.snapshot();
    for (key, watch) in snapshot.watch_counts().iter() {
        assert_eq!(
            watch.total_watches,
            watch.counted_total(),
            "total out of step for {}",
            key
        );
    }
    for (_, series) in snapshot.series_status().iter() {
        for season in series.seasons.values() {
            for progress in season.languages.values() {
                assert_eq!(
                    progress.last_episode,
                    progress.watched_episodes.iter().next_back().copied()
                );
            }
        }
    }
}

#[tokio::test]
async fn test_demon_slayer_walkthrough() {
    let (handle, _task) = start(TrackerState::default(), Arc::new(MockKvStore::new()));

    // First viewing of episode 5.
    let first = assert_ok!(handle.ingest(demon_slayer(5, "https://x/ep5", 1_000)).await);
    assert!(!first.duplicate);

    let snapshot = handle.snapshot();
    let history = snapshot.history().query(&HistoryFilter::new());
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event.language, "VOSTFR");

    let watch = handle.watch_count(&key()).expect("bucket exists");
    assert_eq!(watch.total_watches, 1);
    assert_eq!(watch.episode(EpisodeSlot::Number(5)).unwrap().count, 1);

    let tree = handle.series_status();
    let progress = &tree.get("demon-slayer").unwrap().seasons["s1"].languages["VOSTFR"];
    assert_eq!(progress.watched_episodes.iter().copied().collect::<Vec<_>>(), vec![5]);
    assert_eq!(progress.last_episode, Some(5));

    // Same page again 500ms later: a duplicate, nothing moves.
    let again = assert_ok!(handle.ingest(demon_slayer(5, "https://x/ep5", 1_500)).await);
    assert!(again.duplicate);
    assert_eq!(again.entry.id, first.entry.id);
    assert_eq!(handle.snapshot().history().len(), 1);
    assert_eq!(handle.watch_count(&key()).unwrap().total_watches, 1);

    // Episode 6.
    assert_ok!(handle.ingest(demon_slayer(6, "https://x/ep6", 100_000)).await);
    assert_eq!(handle.snapshot().history().len(), 2);
    assert_eq!(handle.watch_count(&key()).unwrap().total_watches, 2);
    let tree = handle.series_status();
    assert_eq!(
        tree.get("demon-slayer").unwrap().seasons["s1"].languages["VOSTFR"].last_episode,
        Some(6)
    );

    // Correct episode 6 to five viewings.
    assert!(assert_ok!(
        handle.correct_count(key(), EpisodeSlot::Number(6), 5).await
    ));
    let watch = handle.watch_count(&key()).unwrap();
    assert_eq!(watch.episode(EpisodeSlot::Number(6)).unwrap().count, 5);
    assert_eq!(watch.total_watches, 6);

    assert_invariants(&handle);
}

#[tokio::test]
async fn test_correct_count_on_missing_episode_mutates_nothing() {
    let store = Arc::new(MockKvStore::new());
    let (handle, _task) = start(TrackerState::default(), store.clone());
    assert_ok!(handle.ingest(demon_slayer(5, "https://x/ep5", 1_000)).await);

    let writes_before = store.set_calls();
    let before = handle.watch_count(&key());

    assert!(!assert_ok!(
        handle.correct_count(key(), EpisodeSlot::Number(12), 3).await
    ));
    assert!(!assert_ok!(
        handle.correct_count(key(), EpisodeSlot::Unknown, 3).await
    ));

    assert_eq!(handle.watch_count(&key()), before);
    assert_eq!(store.set_calls(), writes_before);
}

#[tokio::test]
async fn test_events_without_episode_share_one_counter() {
    let (handle, _task) = start(TrackerState::default(), Arc::new(MockKvStore::new()));

    for (url, at) in [("https://x/film-a", 1_000), ("https://x/film-b", 200_000)] {
        let raw: RawEvent = serde_json::from_value(json!({
            "animeName": "demon-slayer",
            "season": "film",
            "language": "VF",
            "url": url,
            "timestamp": at
        }))
        .unwrap();
        assert_ok!(handle.ingest(raw).await);
    }

    let film = SeriesKey::new("demon-slayer", "film", "vf");
    let watch = handle.watch_count(&film).unwrap();
    assert_eq!(watch.episodes.len(), 1);
    assert_eq!(watch.episode(EpisodeSlot::Unknown).unwrap().count, 2);

    let tree = handle.series_status();
    let progress = &tree.get("demon-slayer").unwrap().seasons["film"].languages["VF"];
    assert!(progress.watched_episodes.is_empty());
    assert_eq!(progress.last_episode, None);
}

#[tokio::test]
async fn test_invariants_hold_over_mixed_operations() {
    let (handle, _task) = start(TrackerState::default(), Arc::new(MockKvStore::new()));

    for ep in 1..=8u32 {
        let url = format!("https://x/ep{}", ep);
        assert_ok!(handle.ingest(demon_slayer(ep, &url, ep as i64 * 120_000)).await);
        // Rewatch of every other episode, well outside the dedup window.
        if ep % 2 == 0 {
            assert_ok!(
                handle
                    .ingest(demon_slayer(ep, &url, ep as i64 * 120_000 + 3_600_000))
                    .await
            );
        }
    }
    assert_ok!(handle.correct_count(key(), EpisodeSlot::Number(2), 0).await);
    assert_ok!(handle.correct_count(key(), EpisodeSlot::Number(7), 9).await);

    assert_invariants(&handle);
    assert_eq!(handle.watch_count(&key()).unwrap().total_watches, 12 - 2 + 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_are_serialized() {
    let (handle, _task) = start(TrackerState::default(), Arc::new(MockKvStore::new()));
    let done = Arc::new(AtomicBool::new(false));

    // Every published snapshot pairs each count with its log entry.
    let reader = {
        let handle = handle.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let mut observed = 0usize;
            while !done.load(Ordering::Acquire) {
                let snapshot = handle.snapshot();
                let counted: u64 = snapshot
                    .watch_counts()
                    .iter()
                    .map(|(_, watch)| watch.total_watches)
                    .sum();
                assert_eq!(counted, snapshot.history().len() as u64);
                observed += 1;
                tokio::task::yield_now().await;
            }
            observed
        })
    };

    let mut callers = Vec::new();
    for i in 0..8i64 {
        let handle = handle.clone();
        callers.push(tokio::spawn(async move {
            handle
                .ingest(demon_slayer(5, "https://x/ep5", 1_000 + i * 1_000))
                .await
        }));
    }
    for ep in 10..16u32 {
        let handle = handle.clone();
        callers.push(tokio::spawn(async move {
            let url = format!("https://x/ep{}", ep);
            handle.ingest(demon_slayer(ep, &url, 1_000)).await
        }));
    }

    let mut results = Vec::new();
    for caller in callers {
        let joined = assert_ok!(caller.await);
        results.push(assert_ok!(joined));
    }
    done.store(true, Ordering::Release);
    assert!(assert_ok!(reader.await) > 0);

    let same_url: Vec<_> = results
        .iter()
        .filter(|ingested| ingested.entry.event.source_url == "https://x/ep5")
        .collect();
    assert_eq!(same_url.len(), 8);
    assert_eq!(same_url.iter().filter(|ingested| !ingested.duplicate).count(), 1);
    assert!(same_url
        .iter()
        .all(|ingested| ingested.entry.id == same_url[0].entry.id));

    let snapshot = handle.snapshot();
    let history = snapshot.history().query(&HistoryFilter::new());
    assert_eq!(history.len(), 7);
    assert_eq!(
        history
            .iter()
            .filter(|entry| entry.event.source_url == "https://x/ep5")
            .count(),
        1
    );

    let watch = handle.watch_count(&key()).unwrap();
    assert_eq!(watch.episode(EpisodeSlot::Number(5)).unwrap().count, 1);
    assert_eq!(watch.total_watches, 7);
    assert_invariants(&handle);
}

#[test]
fn test_log_keeps_newest_thousand() {
    let policy = HistoryConfig::default();
    let mut log = HistoryLog::new(policy);

    let mut first_id = None;
    for i in 0..1001i64 {
        let raw = demon_slayer(1, &format!("https://x/{}", i), i * 1_000);
        let event = animelog_core::normalize(raw, 0).unwrap();
        let entry = log.append(event, i).into_entry();
        first_id.get_or_insert(entry.id);
    }

    let all = log.query(&HistoryFilter::new());
    assert_eq!(all.len(), 1000);
    assert!(all.iter().all(|entry| Some(&entry.id) != first_id.as_ref()));
    assert_eq!(all[0].event.source_url, "https://x/1000");
}

#[tokio::test]
async fn test_storage_failure_then_retry_flushes() {
    let store = Arc::new(MockKvStore::new());
    let (handle, _task) = start(TrackerState::default(), store.clone());

    store.set_failing(true);
    let err = assert_err!(handle.ingest(demon_slayer(5, "https://x/ep5", 1_000)).await);
    assert!(matches!(err, TrackerError::Storage(_)));
    assert_eq!(handle.snapshot().history().len(), 1);

    store.set_failing(false);
    let retried = assert_ok!(handle.ingest(demon_slayer(5, "https://x/ep5", 1_000)).await);
    assert!(retried.duplicate);
    assert_eq!(handle.watch_count(&key()).unwrap().total_watches, 1);

    let stored = store.get(&[keys::HISTORY]).unwrap();
    assert_eq!(stored[keys::HISTORY].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reset_persists_empty_documents() {
    let store = Arc::new(MockKvStore::new());
    let (handle, _task) = start(TrackerState::default(), store.clone());
    assert_ok!(handle.ingest(demon_slayer(5, "https://x/ep5", 1_000)).await);

    assert_ok!(handle.reset().await);

    let stored = store
        .get(&[keys::HISTORY, keys::WATCH_COUNT, keys::SERIES_STATUS])
        .unwrap();
    assert_eq!(stored[keys::HISTORY], json!([]));
    assert_eq!(stored[keys::WATCH_COUNT], json!({}));
    assert_eq!(stored[keys::SERIES_STATUS], json!({}));
}

#[tokio::test]
async fn test_state_survives_restart_on_sqlite() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("animelog.db");

    {
        let store = Arc::new(SqliteKvStore::new(&db_path).expect("Failed to open store"));
        let (handle, task) = start(TrackerState::default(), store);
        assert_ok!(handle.ingest(demon_slayer(5, "https://x/ep5", 1_000)).await);
        assert_ok!(handle.ingest(demon_slayer(6, "https://x/ep6", 100_000)).await);
        drop(handle);
        task.await.unwrap();
    }

    let store = Arc::new(SqliteKvStore::new(&db_path).expect("Failed to reopen store"));
    let state = TrackerState::load(store.as_ref(), HistoryConfig::default()).unwrap();
    let (handle, _task) = start(state, store);

    assert_eq!(handle.snapshot().history().len(), 2);
    assert_eq!(handle.watch_count(&key()).unwrap().total_watches, 2);

    // The dedup window still applies to entries loaded from disk.
    let again = assert_ok!(handle.ingest(demon_slayer(6, "https://x/ep6", 110_000)).await);
    assert!(again.duplicate);
}
