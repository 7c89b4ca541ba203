// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Timer-driven poll loop
//!
//! Each tick walks the tracked repositories one at a time and runs the
//! per-repository sequence: read cursor, fetch window, reconcile, persist,
//! notify. A failure in one repository is logged and recorded in the tick's
//! [`CycleSummary`]; the remaining repositories are still processed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::commit::CommitId;
use crate::contract::{CommitFetcher, CursorStore, Notifier};
use crate::error::{FetchError, PersistenceError};
use crate::reconcile::reconcile;
use crate::repo::{RepoKey, TrackedRepo};
use crate::window::{DEFAULT_WINDOW_LIMIT, ESTABLISH_WINDOW_LIMIT, FetchWindow};

/// Default time between ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Poll loop tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Time between ticks
    pub interval: Duration,
    /// Commits requested per fetch
    pub window_limit: usize,
    /// Pause between repositories within one tick
    pub spacing: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            window_limit: DEFAULT_WINDOW_LIMIT,
            spacing: Duration::ZERO,
        }
    }
}

impl PollOptions {
    /// Set the tick interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the fetch window size (at least 1)
    #[must_use]
    pub fn with_window_limit(mut self, limit: usize) -> Self {
        self.window_limit = limit.max(1);
        self
    }

    /// Set the pause between repositories
    #[must_use]
    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }
}

/// Observable state of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    /// Waiting for the next tick or trigger
    #[default]
    Idle,
    /// Running repository sequences
    Checking,
}

/// Handle that starts a tick immediately
#[derive(Debug, Clone)]
pub struct PollTrigger {
    notify: Arc<Notify>,
}

impl PollTrigger {
    /// Wake the loop; a trigger while a tick is running queues one more tick
    pub fn trigger(&self) {
        self.notify.notify_one();
    }
}

/// Why a repository was skipped this tick
#[derive(Debug)]
pub enum SkipReason {
    /// The stored cursor could not be read
    ReadCursor(PersistenceError),
    /// The fetch failed; no window this tick
    Fetch(FetchError),
    /// The new cursor could not be written; nothing was notified
    WriteCursor(PersistenceError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ReadCursor(e) => write!(f, "cursor read failed: {e}"),
            SkipReason::Fetch(e) => write!(f, "fetch failed: {e}"),
            SkipReason::WriteCursor(e) => write!(f, "cursor write failed: {e}"),
        }
    }
}

/// Outcome of one repository sequence
#[derive(Debug)]
pub enum CycleReport {
    /// Nothing new; cursor untouched
    Unchanged,
    /// First contact; cursor set to the newest commit, nothing reported
    Established(CommitId),
    /// New commits found and the cursor advanced
    Updated {
        /// Number of new commits
        count: usize,
        /// The previous cursor was outside the fetched window
        truncated: bool,
        /// The notifier accepted the batch
        delivered: bool,
    },
    /// The sequence stopped early; nothing persisted or notified
    Skipped(SkipReason),
}

impl CycleReport {
    /// Number of new commits reported
    #[must_use]
    pub fn new_commits(&self) -> usize {
        match self {
            CycleReport::Updated { count, .. } => *count,
            _ => 0,
        }
    }

    /// Whether the sequence was skipped
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, CycleReport::Skipped(_))
    }
}

/// Reports for every repository processed in one tick
#[derive(Debug, Default)]
pub struct CycleSummary {
    /// Per-repository outcomes in processing order
    pub reports: Vec<(RepoKey, CycleReport)>,
    /// The tick stopped early because of cancellation
    pub cancelled: bool,
}

impl CycleSummary {
    /// Repositories processed
    #[must_use]
    pub fn checked(&self) -> usize {
        self.reports.len()
    }

    /// Repositories with new commits
    #[must_use]
    pub fn updated(&self) -> usize {
        self.reports
            .iter()
            .filter(|(_, r)| matches!(r, CycleReport::Updated { .. }))
            .count()
    }

    /// Repositories whose cursor was established this tick
    #[must_use]
    pub fn established(&self) -> usize {
        self.reports
            .iter()
            .filter(|(_, r)| matches!(r, CycleReport::Established(_)))
            .count()
    }

    /// Repositories skipped because of an error
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.reports.iter().filter(|(_, r)| r.is_skipped()).count()
    }

    /// Total new commits across all repositories
    #[must_use]
    pub fn new_commits(&self) -> usize {
        self.reports.iter().map(|(_, r)| r.new_commits()).sum()
    }

    /// Report for one repository
    #[must_use]
    pub fn report(&self, repo: &RepoKey) -> Option<&CycleReport> {
        self.reports.iter().find(|(k, _)| k == repo).map(|(_, r)| r)
    }
}

/// Drives reconciliation cycles over the tracked repositories
pub struct Poller {
    fetcher: Arc<dyn CommitFetcher>,
    store: Arc<dyn CursorStore>,
    notifier: Arc<dyn Notifier>,
    options: PollOptions,
    state: watch::Sender<PollState>,
    trigger: Arc<Notify>,
}

impl Poller {
    /// Create a poller with default options
    pub fn new(
        fetcher: Arc<dyn CommitFetcher>,
        store: Arc<dyn CursorStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            fetcher,
            store,
            notifier,
            options: PollOptions::default(),
            state,
            trigger: Arc::new(Notify::new()),
        }
    }

    /// Replace the options
    #[must_use]
    pub fn with_options(mut self, options: PollOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options
    #[must_use]
    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Watch state transitions
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Handle for starting a tick on demand
    #[must_use]
    pub fn trigger_handle(&self) -> PollTrigger {
        PollTrigger {
            notify: Arc::clone(&self.trigger),
        }
    }

    /// Run one repository sequence outside the loop
    pub async fn check_repository(&self, repo: &TrackedRepo) -> CycleReport {
        self.state.send_replace(PollState::Checking);
        let report = self.sequence(repo, self.options.window_limit).await;
        self.state.send_replace(PollState::Idle);
        report
    }

    /// Set the cursor of a newly subscribed repository to its current head
    ///
    /// Fetches a single commit. A repository that already has a cursor is
    /// left alone and reported as [`CycleReport::Unchanged`].
    pub async fn establish(&self, repo: &TrackedRepo) -> CycleReport {
        match self.store.get(&repo.key).await {
            Ok(Some(cursor)) => {
                debug!(repo = %repo.key, cursor = %cursor, "Cursor already established");
                CycleReport::Unchanged
            }
            Ok(None) => self.sequence(repo, ESTABLISH_WINDOW_LIMIT).await,
            Err(e) => CycleReport::Skipped(SkipReason::ReadCursor(e)),
        }
    }

    /// Run one tick over every tracked repository
    ///
    /// Cancellation is honoured between repositories; a sequence that has
    /// started always finishes.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleSummary, PersistenceError> {
        let repos = self.store.tracked().await?;
        let mut summary = CycleSummary::default();

        self.state.send_replace(PollState::Checking);
        for (i, repo) in repos.iter().enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            if i > 0 && !self.options.spacing.is_zero() {
                tokio::select! {
                    () = cancel.cancelled() => {
                        summary.cancelled = true;
                        break;
                    }
                    () = tokio::time::sleep(self.options.spacing) => {}
                }
            }
            let report = self.sequence(repo, self.options.window_limit).await;
            summary.reports.push((repo.key.clone(), report));
        }
        self.state.send_replace(PollState::Idle);

        info!(
            checked = summary.checked(),
            updated = summary.updated(),
            established = summary.established(),
            skipped = summary.skipped(),
            new_commits = summary.new_commits(),
            "Poll cycle complete"
        );
        Ok(summary)
    }

    /// Tick until `cancel` fires
    ///
    /// The first tick runs immediately. Returns the number of ticks completed.
    pub async fn run(&self, cancel: CancellationToken) -> usize {
        info!(
            interval_secs = self.options.interval.as_secs(),
            window = self.options.window_limit,
            "Starting poll loop"
        );
        let mut ticks = 0usize;
        loop {
            if cancel.is_cancelled() {
                break;
            }
            match self.run_cycle(&cancel).await {
                Ok(_) => ticks += 1,
                Err(e) => warn!(error = %e, "Failed to read tracked repositories"),
            }
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.options.interval) => {}
                () = self.trigger.notified() => debug!("Manual trigger"),
            }
        }
        info!(ticks, "Poll loop stopped");
        ticks
    }

    async fn sequence(&self, repo: &TrackedRepo, limit: usize) -> CycleReport {
        let key = &repo.key;

        let prior = match self.store.get(key).await {
            Ok(prior) => prior,
            Err(e) => {
                warn!(repo = %key, error = %e, "Failed to read cursor, skipping");
                return CycleReport::Skipped(SkipReason::ReadCursor(e));
            }
        };

        let records = match self.fetcher.fetch(repo, limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    repo = %key,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Failed to fetch commits, skipping"
                );
                return CycleReport::Skipped(SkipReason::Fetch(e));
            }
        };
        let window = FetchWindow::bounded(records, limit);
        debug!(repo = %key, window = window.len(), prior = ?prior.as_ref().map(CommitId::short), "Fetched window");

        let result = reconcile(&window, prior.as_ref());
        if result.truncated {
            warn!(
                repo = %key,
                delivered = result.new_commits.len(),
                "Previous cursor not in fetched window (force-push or window too small), reporting whole window"
            );
        }

        if !result.should_persist(prior.as_ref()) {
            return CycleReport::Unchanged;
        }
        let Some(next) = result.next_cursor.clone() else {
            return CycleReport::Unchanged;
        };
        if let Err(e) = self.store.set(key, &next).await {
            warn!(repo = %key, error = %e, "Failed to persist cursor, skipping notification");
            return CycleReport::Skipped(SkipReason::WriteCursor(e));
        }

        if result.new_commits.is_empty() {
            info!(repo = %key, cursor = %next.short(), "Established cursor");
            return CycleReport::Established(next);
        }

        let count = result.new_commits.len();
        info!(repo = %key, count, cursor = %next.short(), "Found new commits");
        let delivered = match self.notifier.notify(repo, &result.new_commits).await {
            Ok(()) => true,
            Err(e) => {
                warn!(repo = %key, error = %e, "Notification failed");
                false
            }
        };

        CycleReport::Updated {
            count,
            truncated: result.truncated,
            delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryCursorStore, RecordingNotifier, ScriptedFetcher, commit, commit_id};
    use similar_asserts::assert_eq;

    fn repo(name: &str) -> TrackedRepo {
        TrackedRepo::new(RepoKey::new("octo", name))
    }

    struct Harness {
        fetcher: Arc<ScriptedFetcher>,
        store: Arc<MemoryCursorStore>,
        notifier: Arc<RecordingNotifier>,
        poller: Poller,
    }

    fn harness(store: MemoryCursorStore) -> Harness {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::new());
        let poller = Poller::new(fetcher.clone(), store.clone(), notifier.clone());
        Harness {
            fetcher,
            store,
            notifier,
            poller,
        }
    }

    #[tokio::test]
    async fn test_first_check_establishes_without_notifying() {
        let cards = repo("cards");
        let h = harness(MemoryCursorStore::new().with_repo(cards.clone()));
        h.fetcher
            .set_history(&cards.key, vec![commit("c2"), commit("c1")]);

        let report = h.poller.check_repository(&cards).await;

        assert!(matches!(report, CycleReport::Established(ref id) if id.as_str() == "c2"));
        assert_eq!(h.store.cursor(&cards.key), Some(commit_id("c2")));
        assert!(h.notifier.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_new_commits_are_persisted_then_notified() {
        let cards = repo("cards");
        let h = harness(
            MemoryCursorStore::new()
                .with_repo(cards.clone())
                .with_cursor(&cards.key, commit_id("c1")),
        );
        h.fetcher
            .set_history(&cards.key, vec![commit("c3"), commit("c2"), commit("c1")]);

        let report = h.poller.check_repository(&cards).await;

        assert!(matches!(
            report,
            CycleReport::Updated {
                count: 2,
                truncated: false,
                delivered: true
            }
        ));
        assert_eq!(h.store.cursor(&cards.key), Some(commit_id("c3")));
        let deliveries = h.notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].id_strs(), vec!["c3", "c2"]);
    }

    #[tokio::test]
    async fn test_unchanged_does_not_write() {
        let cards = repo("cards");
        let h = harness(
            MemoryCursorStore::new()
                .with_repo(cards.clone())
                .with_cursor(&cards.key, commit_id("c1")),
        );
        h.fetcher.set_history(&cards.key, vec![commit("c1")]);

        let report = h.poller.check_repository(&cards).await;

        assert!(matches!(report, CycleReport::Unchanged));
        assert_eq!(h.store.writes(), 0);
        assert!(h.notifier.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_skips_repository() {
        let cards = repo("cards");
        let h = harness(
            MemoryCursorStore::new()
                .with_repo(cards.clone())
                .with_cursor(&cards.key, commit_id("c1")),
        );
        h.fetcher
            .fail_next(&cards.key, FetchError::Network("connection reset".to_string()));

        let report = h.poller.check_repository(&cards).await;

        assert!(matches!(report, CycleReport::Skipped(SkipReason::Fetch(_))));
        assert_eq!(h.store.cursor(&cards.key), Some(commit_id("c1")));
        assert!(h.notifier.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_suppresses_notification() {
        let cards = repo("cards");
        let h = harness(
            MemoryCursorStore::new()
                .with_repo(cards.clone())
                .with_cursor(&cards.key, commit_id("c1")),
        );
        h.fetcher
            .set_history(&cards.key, vec![commit("c2"), commit("c1")]);
        h.store.fail_writes(true);

        let report = h.poller.check_repository(&cards).await;

        assert!(matches!(
            report,
            CycleReport::Skipped(SkipReason::WriteCursor(_))
        ));
        assert!(h.notifier.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_notify_failure_keeps_cursor() {
        let cards = repo("cards");
        let h = harness(
            MemoryCursorStore::new()
                .with_repo(cards.clone())
                .with_cursor(&cards.key, commit_id("c1")),
        );
        h.fetcher
            .set_history(&cards.key, vec![commit("c2"), commit("c1")]);
        h.notifier.fail_with("renderer offline");

        let report = h.poller.check_repository(&cards).await;

        assert!(matches!(
            report,
            CycleReport::Updated {
                delivered: false,
                ..
            }
        ));
        assert_eq!(h.store.cursor(&cards.key), Some(commit_id("c2")));

        // The next check does not re-deliver
        let report = h.poller.check_repository(&cards).await;
        assert!(matches!(report, CycleReport::Unchanged));
    }

    #[tokio::test]
    async fn test_truncated_window_reports_everything() {
        let cards = repo("cards");
        let h = harness(
            MemoryCursorStore::new()
                .with_repo(cards.clone())
                .with_cursor(&cards.key, commit_id("gone")),
        );
        h.fetcher
            .set_history(&cards.key, vec![commit("r2"), commit("r1")]);

        let report = h.poller.check_repository(&cards).await;

        assert!(matches!(
            report,
            CycleReport::Updated {
                count: 2,
                truncated: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cycle_continues_after_failure() {
        let a = repo("a");
        let b = repo("b");
        let h = harness(
            MemoryCursorStore::new()
                .with_repo(a.clone())
                .with_repo(b.clone())
                .with_cursor(&a.key, commit_id("a1"))
                .with_cursor(&b.key, commit_id("b1")),
        );
        h.fetcher.fail_next(&a.key, FetchError::NotFound {
            repo: a.key.to_string(),
        });
        h.fetcher
            .set_history(&b.key, vec![commit("b2"), commit("b1")]);

        let summary = h
            .poller
            .run_cycle(&CancellationToken::new())
            .await
            .expect("cycle");

        assert_eq!(summary.checked(), 2);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.updated(), 1);
        assert_eq!(summary.new_commits(), 1);
        assert!(summary.report(&a.key).is_some_and(CycleReport::is_skipped));
        assert_eq!(h.notifier.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_uses_configured_window_limit() {
        let cards = repo("cards");
        let h = harness(MemoryCursorStore::new().with_repo(cards.clone()));
        let poller = h
            .poller
            .with_options(PollOptions::default().with_window_limit(25));

        poller
            .run_cycle(&CancellationToken::new())
            .await
            .expect("cycle");

        assert_eq!(h.fetcher.calls(), vec![(cards.key.clone(), 25)]);
    }

    #[tokio::test]
    async fn test_cancelled_cycle_processes_nothing() {
        let h = harness(MemoryCursorStore::new().with_repo(repo("cards")));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = h.poller.run_cycle(&cancel).await.expect("cycle");

        assert!(summary.cancelled);
        assert_eq!(summary.checked(), 0);
        assert!(h.fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_tracked_failure_is_an_error() {
        let h = harness(MemoryCursorStore::new());
        h.store.fail_reads(true);
        assert!(h.poller.run_cycle(&CancellationToken::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_establish_uses_single_commit_window() {
        let cards = repo("cards");
        let h = harness(MemoryCursorStore::new().with_repo(cards.clone()));
        h.fetcher
            .set_history(&cards.key, vec![commit("c2"), commit("c1")]);

        let report = h.poller.establish(&cards).await;

        assert!(matches!(report, CycleReport::Established(_)));
        assert_eq!(h.fetcher.calls(), vec![(cards.key.clone(), ESTABLISH_WINDOW_LIMIT)]);
    }

    #[tokio::test]
    async fn test_establish_keeps_existing_cursor() {
        let cards = repo("cards");
        let h = harness(
            MemoryCursorStore::new()
                .with_repo(cards.clone())
                .with_cursor(&cards.key, commit_id("c1")),
        );

        let report = h.poller.establish(&cards).await;

        assert!(matches!(report, CycleReport::Unchanged));
        assert!(h.fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_state_returns_to_idle() {
        let cards = repo("cards");
        let h = harness(MemoryCursorStore::new().with_repo(cards.clone()));
        let rx = h.poller.subscribe();

        h.poller.check_repository(&cards).await;

        assert_eq!(h.poller.state(), PollState::Idle);
        assert_eq!(*rx.borrow(), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_cancelled() {
        let cards = repo("cards");
        let h = harness(MemoryCursorStore::new().with_repo(cards.clone()));
        h.fetcher.set_history(&cards.key, vec![commit("c1")]);
        let poller = Arc::new(
            h.poller
                .with_options(PollOptions::default().with_interval(Duration::from_secs(60))),
        );
        let cancel = CancellationToken::new();

        let handle = tokio::spawn({
            let poller = Arc::clone(&poller);
            let cancel = cancel.clone();
            async move { poller.run(cancel).await }
        });

        // Paused clock auto-advances through the sleeps
        tokio::time::sleep(Duration::from_secs(150)).await;
        h.fetcher.push_commit(&cards.key, commit("c2"));
        tokio::time::sleep(Duration::from_secs(60)).await;
        cancel.cancel();

        let ticks = handle.await.expect("join");
        assert!(ticks >= 3, "expected at least 3 ticks, got {ticks}");
        let deliveries = h.notifier.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].id_strs(), vec!["c2"]);
    }

    #[tokio::test]
    async fn test_trigger_starts_tick_early() {
        let cards = repo("cards");
        let h = harness(MemoryCursorStore::new().with_repo(cards.clone()));
        let poller = Arc::new(
            h.poller
                .with_options(PollOptions::default().with_interval(Duration::from_secs(3600))),
        );
        let trigger = poller.trigger_handle();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn({
            let poller = Arc::clone(&poller);
            let cancel = cancel.clone();
            async move { poller.run(cancel).await }
        });

        // Wait for the first tick to finish
        while h.fetcher.calls().is_empty() {
            tokio::task::yield_now().await;
        }
        trigger.trigger();
        while h.fetcher.calls().len() < 2 {
            tokio::task::yield_now().await;
        }
        cancel.cancel();

        let ticks = handle.await.expect("join");
        assert!(ticks >= 2);
    }
}
