//! End-to-end pipeline tests against on-disk stores

use crate::common::{body_for, pipeline, temp_store, FetchScript, HangingFetcher, ScriptedFetcher};
use chrono::{DateTime, Utc};
use frontier_harvest::crawler::{harvest, sha256_hex, FetchCoordinator, Seeder};
use frontier_harvest::state::{PageState, PageStatus};
use frontier_harvest::storage::{
    open_store, CommitOutcome, FrontierStore, PageRecord, SharedStore, SqliteStorage,
    StorageError, StorageResult,
};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn urls(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://site{}.example/", i)).collect()
}

fn fetched_content(store: &SharedStore, url: &str) -> Option<Vec<u8>> {
    store
        .get_page(url)
        .unwrap()
        .and_then(|page| page.state.fetched().map(|f| f.content.clone()))
}

#[tokio::test]
async fn test_seed_is_idempotent_across_reopen() {
    let (_dir, path, store) = temp_store();
    let candidates = vec!["a.com", "b.com", "a.com"];

    let report = Seeder::new(store.clone()).seed(&candidates);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed, 0);
    drop(store);

    let store = open_store(&path).unwrap();
    let report = Seeder::new(store.clone()).seed(&candidates);
    assert_eq!(report.inserted, 0);

    let mut pending = store.list_pending().unwrap();
    pending.sort();
    assert_eq!(pending, vec!["a.com", "b.com"]);
}

#[tokio::test]
async fn test_failed_fetch_stays_pending() {
    let (_dir, path, store) = temp_store();
    let fetcher = ScriptedFetcher::new(FetchScript {
        failing: ["u1".to_string()].into_iter().collect(),
        prefix: "body".into(),
        ..FetchScript::default()
    });

    let summary = harvest(
        store.clone(),
        fetcher,
        vec!["u1".into(), "u2".into()],
        &pipeline(&path, 2),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.seed.inserted, 2);
    assert_eq!(summary.fetch.total, 2);
    assert_eq!(summary.fetch.succeeded, 1);
    assert_eq!(summary.fetch.fetch_failures, 1);

    assert!(store.get_page("u1").unwrap().unwrap().state.is_pending());
    assert_eq!(fetched_content(&store, "u2"), Some(body_for("body", "u2")));
    assert_eq!(store.list_pending().unwrap(), vec!["u1"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_are_all_persisted() {
    let (_dir, path, store) = temp_store();
    let all = urls(40);
    let fetcher = ScriptedFetcher::new(FetchScript {
        prefix: "page".into(),
        delay: Duration::from_millis(20),
        ..FetchScript::default()
    });
    let stats = fetcher.stats();

    let summary = harvest(
        store.clone(),
        fetcher,
        all.clone(),
        &pipeline(&path, 8),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.fetch.succeeded, 40);
    assert_eq!(summary.fetch.added, 40);
    assert_eq!(stats.calls.load(Ordering::SeqCst), 40);
    assert!(stats.max_in_flight.load(Ordering::SeqCst) <= 8);
    assert!(store.list_pending().unwrap().is_empty());

    for url in &all {
        let record = store.get_page(url).unwrap().unwrap();
        let fetched = record.state.fetched().expect("page should be fetched");
        let expected = body_for("page", url);
        assert_eq!(fetched.content, expected);
        assert_eq!(fetched.digest, sha256_hex(&expected));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_never_exceeds_worker_count() {
    let (_dir, path, store) = temp_store();
    Seeder::new(store.clone()).seed(&urls(30));

    let fetcher = ScriptedFetcher::new(FetchScript {
        delay: Duration::from_millis(10),
        ..FetchScript::default()
    });
    let stats = fetcher.stats();

    let report = FetchCoordinator::new(store, fetcher, &pipeline(&path, 3))
        .run()
        .await
        .unwrap();

    assert_eq!(report.completed, 30);
    let peak = stats.max_in_flight.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 3, "peak in-flight was {}", peak);
}

#[tokio::test]
async fn test_interrupted_run_resumes_remaining_urls() {
    let (_dir, path, store) = temp_store();
    let all = urls(10);
    Seeder::new(store.clone()).seed(&all);

    let cancel = CancellationToken::new();
    let fetcher = ScriptedFetcher::new(FetchScript {
        prefix: "first".into(),
        cancel_after: Some((3, cancel.clone())),
        ..FetchScript::default()
    });

    let report = FetchCoordinator::new(store.clone(), fetcher, &pipeline(&path, 1))
        .with_cancellation(cancel)
        .run()
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.succeeded, 3);
    drop(store);

    // A fresh process sees exactly the URLs that were not committed
    let store = open_store(&path).unwrap();
    assert_eq!(store.list_pending().unwrap().len(), 7);
    assert_eq!(store.count_pages_by_state(PageStatus::Fetched).unwrap(), 3);

    let fetcher = ScriptedFetcher::succeeding("second");
    let report = FetchCoordinator::new(store.clone(), fetcher, &pipeline(&path, 4))
        .run()
        .await
        .unwrap();

    assert_eq!(report.total, 7);
    assert_eq!(report.added, 7);
    assert!(store.list_pending().unwrap().is_empty());
}

#[tokio::test]
async fn test_every_record_is_pending_or_complete() {
    let (_dir, path, store) = temp_store();
    let all = urls(12);
    let failing = all.iter().step_by(3).cloned().collect();
    let fetcher = ScriptedFetcher::new(FetchScript {
        failing,
        prefix: "x".into(),
        ..FetchScript::default()
    });

    let summary = harvest(
        store.clone(),
        fetcher,
        all.clone(),
        &pipeline(&path, 4),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.fetch.fetch_failures, 4);
    assert_eq!(summary.fetch.succeeded, 8);

    // get_page rejects rows with only some of the fetch columns set
    for url in &all {
        match store.get_page(url).unwrap().unwrap().state {
            PageState::Pending => {}
            PageState::Fetched(fetched) => {
                assert!(!fetched.content.is_empty());
                assert_eq!(fetched.digest, sha256_hex(&fetched.content));
            }
        }
    }
}

#[tokio::test]
async fn test_reseeding_never_regresses_fetched_pages() {
    let (_dir, path, store) = temp_store();

    harvest(
        store.clone(),
        ScriptedFetcher::succeeding("v1"),
        vec!["a.com".into()],
        &pipeline(&path, 1),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let summary = harvest(
        store.clone(),
        ScriptedFetcher::succeeding("v2"),
        vec!["a.com".into(), "b.com".into()],
        &pipeline(&path, 1),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.seed.inserted, 1);
    assert_eq!(summary.fetch.total, 1);
    assert_eq!(fetched_content(&store, "a.com"), Some(body_for("v1", "a.com")));
    assert_eq!(fetched_content(&store, "b.com"), Some(body_for("v2", "b.com")));
}

#[tokio::test]
async fn test_urls_seeded_mid_run_wait_for_next_run() {
    let (_dir, path, store) = temp_store();
    Seeder::new(store.clone()).seed(&["a.com", "b.com"]);

    let fetcher = ScriptedFetcher::new(FetchScript {
        seed_during_fetch: Some((store.clone(), "late.com".to_string())),
        ..FetchScript::default()
    });
    let stats = fetcher.stats();

    let report = FetchCoordinator::new(store.clone(), fetcher, &pipeline(&path, 2))
        .run()
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(stats.calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.list_pending().unwrap(), vec!["late.com"]);
}

#[tokio::test]
async fn test_stale_pages_are_refetched() {
    let (_dir, path, store) = temp_store();
    let config = pipeline(&path, 2);

    harvest(
        store.clone(),
        ScriptedFetcher::succeeding("v1"),
        vec!["a.com".into(), "b.com".into()],
        &config,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(store.mark_stale("a.com").unwrap());
    assert!(!store.mark_stale("unknown.com").unwrap());
    assert_eq!(store.list_stale().unwrap(), vec!["a.com"]);

    // Same content: recorded as unchanged and the flag is cleared
    let report = FetchCoordinator::new(store.clone(), ScriptedFetcher::succeeding("v1"), &config)
        .run()
        .await
        .unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(report.unchanged, 1);
    assert!(store.list_stale().unwrap().is_empty());

    // New content replaces the old
    store.mark_stale("b.com").unwrap();
    let report = FetchCoordinator::new(store.clone(), ScriptedFetcher::succeeding("v2"), &config)
        .run()
        .await
        .unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(fetched_content(&store, "b.com"), Some(body_for("v2", "b.com")));
    assert_eq!(fetched_content(&store, "a.com"), Some(body_for("v1", "a.com")));
}

#[tokio::test]
async fn test_failed_refetch_keeps_previous_content() {
    let (_dir, path, store) = temp_store();
    let config = pipeline(&path, 1);

    harvest(
        store.clone(),
        ScriptedFetcher::succeeding("v1"),
        vec!["a.com".into()],
        &config,
        CancellationToken::new(),
    )
    .await
    .unwrap();
    store.mark_stale("a.com").unwrap();

    let fetcher = ScriptedFetcher::new(FetchScript {
        failing: ["a.com".to_string()].into_iter().collect(),
        ..FetchScript::default()
    });
    let report = FetchCoordinator::new(store.clone(), fetcher, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.fetch_failures, 1);
    let record = store.get_page("a.com").unwrap().unwrap();
    assert!(record.stale);
    assert_eq!(
        record.state.fetched().map(|f| f.content.clone()),
        Some(body_for("v1", "a.com"))
    );
}

#[tokio::test]
async fn test_timed_out_fetch_stays_pending() {
    let (_dir, path, store) = temp_store();
    Seeder::new(store.clone()).seed(&["slow.com"]);

    let mut config = pipeline(&path, 1);
    config.fetch_timeout = Duration::from_millis(100);

    let report = FetchCoordinator::new(store.clone(), HangingFetcher, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.succeeded, 0);
    assert_eq!(store.list_pending().unwrap(), vec!["slow.com"]);
}

/// Delegates to SQLite but rejects writes for chosen URLs
struct RejectingStore {
    inner: SqliteStorage,
    reject_seed: Option<String>,
    reject_commit: Option<String>,
}

impl RejectingStore {
    fn new() -> Self {
        Self {
            inner: SqliteStorage::new_in_memory().unwrap(),
            reject_seed: None,
            reject_commit: None,
        }
    }
}

impl FrontierStore for RejectingStore {
    fn seed_insert_if_absent(&mut self, url: &str) -> StorageResult<bool> {
        if self.reject_seed.as_deref() == Some(url) {
            return Err(StorageError::Unavailable("database is locked".into()));
        }
        self.inner.seed_insert_if_absent(url)
    }

    fn list_pending(&self) -> StorageResult<Vec<String>> {
        self.inner.list_pending()
    }

    fn list_stale(&self) -> StorageResult<Vec<String>> {
        self.inner.list_stale()
    }

    fn commit_fetch(
        &mut self,
        url: &str,
        content: &[u8],
        digest: &str,
        fetched_at: DateTime<Utc>,
    ) -> StorageResult<CommitOutcome> {
        if self.reject_commit.as_deref() == Some(url) {
            return Err(StorageError::Unavailable("disk full".into()));
        }
        self.inner.commit_fetch(url, content, digest, fetched_at)
    }

    fn mark_stale(&mut self, url: &str) -> StorageResult<bool> {
        self.inner.mark_stale(url)
    }

    fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        self.inner.get_page(url)
    }

    fn count_pages_by_state(&self, status: PageStatus) -> StorageResult<u64> {
        self.inner.count_pages_by_state(status)
    }

    fn count_total_pages(&self) -> StorageResult<u64> {
        self.inner.count_total_pages()
    }

    fn count_stale_pages(&self) -> StorageResult<u64> {
        self.inner.count_stale_pages()
    }
}

#[tokio::test]
async fn test_commit_failure_leaves_page_pending() {
    let (_dir, path, _unused) = temp_store();
    let store = SharedStore::new(RejectingStore {
        reject_commit: Some("bad.com".into()),
        ..RejectingStore::new()
    });

    let summary = harvest(
        store.clone(),
        ScriptedFetcher::succeeding("ok"),
        vec!["good.com".into(), "bad.com".into()],
        &pipeline(&path, 2),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.fetch.completed, 2);
    assert_eq!(summary.fetch.succeeded, 1);
    assert_eq!(summary.fetch.commit_failures, 1);
    assert_eq!(store.list_pending().unwrap(), vec!["bad.com"]);
    assert!(fetched_content(&store, "good.com").is_some());
}

#[tokio::test]
async fn test_seed_failure_is_skipped_and_counted() {
    let store = SharedStore::new(RejectingStore {
        reject_seed: Some("b.com".into()),
        ..RejectingStore::new()
    });
    let mut ticks = Vec::new();

    let report = Seeder::new(store.clone())
        .seed_with_progress(&["a.com", "b.com", "c.com", "d.com"], |p| ticks.push(p.to_string()));

    assert_eq!(report.total, 4);
    assert_eq!(report.processed, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(report.inserted, 3);
    assert!(!report.cancelled);
    assert_eq!(ticks.last().map(String::as_str), Some("[4/4] inserted: 3"));

    assert!(store.get_page("b.com").unwrap().is_none());
    assert_eq!(store.list_pending().unwrap(), vec!["a.com", "c.com", "d.com"]);
}

#[tokio::test]
async fn test_cancelled_harvest_seeds_and_fetches_nothing() {
    let (_dir, path, store) = temp_store();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let fetcher = ScriptedFetcher::succeeding("x");
    let stats = fetcher.stats();

    let summary = harvest(store.clone(), fetcher, urls(5000), &pipeline(&path, 4), cancel)
        .await
        .unwrap();

    assert!(summary.seed.cancelled);
    assert_eq!(summary.seed.inserted, 0);
    assert!(summary.fetch.cancelled);
    assert_eq!(summary.fetch.dispatched, 0);
    assert_eq!(stats.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.count_total_pages().unwrap(), 0);
}

#[tokio::test]
async fn test_cancel_during_seeding_stops_the_pass() {
    let (_dir, path, store) = temp_store();
    let cancel = CancellationToken::new();
    let all = urls(5000);

    // Cancel from another thread while the blocking seed pass is running
    let watcher_store = store.clone();
    let trigger = cancel.clone();
    let watcher = std::thread::spawn(move || loop {
        if watcher_store.count_total_pages().unwrap() >= 10 {
            trigger.cancel();
            break;
        }
        std::thread::yield_now();
    });

    let summary = harvest(
        store.clone(),
        ScriptedFetcher::succeeding("x"),
        all,
        &pipeline(&path, 4),
        cancel,
    )
    .await
    .unwrap();
    watcher.join().unwrap();

    assert!(summary.seed.cancelled);
    assert!(summary.seed.inserted >= 10);
    assert!(summary.seed.inserted < 5000);
    assert_eq!(summary.fetch.dispatched, 0);
    assert_eq!(
        store.count_total_pages().unwrap() as usize,
        summary.seed.inserted
    );
}
