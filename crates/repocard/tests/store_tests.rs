// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The poll loop against the JSON subscription file
//!
//! Cursors written by one `Poller` must survive into a fresh store opened on
//! the same file, the way `monitor` restarts pick up where they left off.

use std::sync::Arc;

use repocard::{JsonCursorStore, Settings};
use repocard_core::testing::{RecordingNotifier, ScriptedFetcher, commit, commit_id};
use repocard_core::{CursorStore, CycleReport, Poller, RepoKey};
use similar_asserts::assert_eq;
use tokio_util::sync::CancellationToken;

fn build(store: Arc<JsonCursorStore>, fetcher: Arc<ScriptedFetcher>) -> (Poller, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    (Poller::new(fetcher, store, notifier.clone()), notifier)
}

#[tokio::test]
async fn test_add_establish_then_update() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    let key = RepoKey::new("octo", "cards");

    let store = Arc::new(JsonCursorStore::open(&path));
    assert!(store.add_repository(&key, Some("main")).await.expect("add"));

    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.set_history(&key, vec![commit("b2"), commit("b1")]);
    let (poller, notifier) = build(store.clone(), fetcher.clone());

    let tracked = store.tracked().await.expect("tracked").remove(0);
    let report = poller.establish(&tracked).await;
    assert!(matches!(report, CycleReport::Established(ref id) if id == &commit_id("b2")));
    assert_eq!(fetcher.calls(), vec![(key.clone(), 1)]);
    assert!(notifier.deliveries().is_empty());

    fetcher.push_commit(&key, commit("b3"));
    let summary = poller.run_cycle(&CancellationToken::new()).await.expect("cycle");
    assert_eq!(summary.new_commits(), 1);
    assert_eq!(notifier.deliveries()[0].id_strs(), vec!["b3"]);

    // a fresh store on the same file sees the advanced cursor
    let reopened = JsonCursorStore::open(&path);
    assert_eq!(reopened.get(&key).await.expect("get"), Some(commit_id("b3")));
}

#[tokio::test]
async fn test_restart_does_not_redeliver() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    let key = RepoKey::new("octo", "docs");
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.set_history(&key, vec![commit("d1")]);

    let first = Arc::new(JsonCursorStore::open(&path));
    first.add_repository(&key, None).await.expect("add");
    let (poller, _) = build(first, fetcher.clone());
    poller.run_cycle(&CancellationToken::new()).await.expect("cycle");
    fetcher.push_commit(&key, commit("d2"));
    poller.run_cycle(&CancellationToken::new()).await.expect("cycle");

    let second = Arc::new(JsonCursorStore::open(&path));
    let (poller, notifier) = build(second, fetcher.clone());
    let summary = poller.run_cycle(&CancellationToken::new()).await.expect("cycle");
    assert_eq!(summary.new_commits(), 0);
    assert!(notifier.deliveries().is_empty());
}

#[tokio::test]
async fn test_subscription_added_between_ticks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(JsonCursorStore::open(dir.path().join("config.json")));
    let fetcher = Arc::new(ScriptedFetcher::new());
    let (poller, _) = build(store.clone(), fetcher.clone());
    let cancel = CancellationToken::new();

    let summary = poller.run_cycle(&cancel).await.expect("cycle");
    assert_eq!(summary.checked(), 0);

    // another process edits the file while the loop runs
    let key = RepoKey::new("late", "comer");
    fetcher.set_history(&key, vec![commit("l1")]);
    let mut settings: Settings = store.load().expect("load");
    settings
        .github
        .repository
        .push(repocard::RepositoryEntry::new(&key, None));
    store.save(&settings).expect("save");

    let summary = poller.run_cycle(&cancel).await.expect("cycle");
    assert_eq!(summary.established(), 1);
}

#[tokio::test]
async fn test_corrupt_file_fails_the_tick() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ broken").expect("write");
    let store = Arc::new(JsonCursorStore::open(&path));
    let (poller, _) = build(store, Arc::new(ScriptedFetcher::new()));
    assert!(poller.run_cycle(&CancellationToken::new()).await.is_err());
}
