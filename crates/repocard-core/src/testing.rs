// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! In-memory collaborators for tests
//!
//! Compiled for this crate's unit tests and, through the `testing` feature,
//! for downstream test suites. Nothing here touches the network or the
//! filesystem.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::commit::{CommitId, CommitRecord};
use crate::contract::{CommitFetcher, CursorStore, Notifier};
use crate::error::{FetchError, NotifyError, PersistenceError};
use crate::reconcile::NewCommits;
use crate::repo::{RepoKey, TrackedRepo};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build a record with the given id and a message derived from it
///
/// # Panics
///
/// Panics if `id` is empty.
#[must_use]
#[track_caller]
pub fn commit(id: &str) -> CommitRecord {
    let commit_id = CommitId::new(id).expect("test commit id must not be empty");
    CommitRecord::new(commit_id)
        .with_author("octocat")
        .with_message(format!("commit {id}"))
}

/// Build a commit id
///
/// # Panics
///
/// Panics if `id` is empty.
#[must_use]
#[track_caller]
pub fn commit_id(id: &str) -> CommitId {
    CommitId::new(id).expect("test commit id must not be empty")
}

// ============================================================================
// Cursor store
// ============================================================================

#[derive(Debug, Default)]
struct StoreState {
    tracked: Vec<TrackedRepo>,
    cursors: HashMap<RepoKey, CommitId>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// Cursor store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    state: Mutex<StoreState>,
}

impl MemoryCursorStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a repository
    #[must_use]
    pub fn with_repo(self, repo: TrackedRepo) -> Self {
        lock(&self.state).tracked.push(repo);
        self
    }

    /// Seed a cursor
    #[must_use]
    pub fn with_cursor(self, repo: &RepoKey, cursor: CommitId) -> Self {
        lock(&self.state).cursors.insert(repo.clone(), cursor);
        self
    }

    /// Current cursor for `repo`
    #[must_use]
    pub fn cursor(&self, repo: &RepoKey) -> Option<CommitId> {
        lock(&self.state).cursors.get(repo).cloned()
    }

    /// Number of successful `set` calls
    #[must_use]
    pub fn writes(&self) -> usize {
        lock(&self.state).writes
    }

    /// Make subsequent `get` and `tracked` calls fail
    pub fn fail_reads(&self, fail: bool) {
        lock(&self.state).fail_reads = fail;
    }

    /// Make subsequent `set` calls fail
    pub fn fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }

    /// Subscribe a repository after construction
    pub fn track(&self, repo: TrackedRepo) {
        lock(&self.state).tracked.push(repo);
    }
}

fn injected() -> PersistenceError {
    PersistenceError::Io(std::io::Error::other("injected failure"))
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn get(&self, repo: &RepoKey) -> Result<Option<CommitId>, PersistenceError> {
        let state = lock(&self.state);
        if state.fail_reads {
            return Err(injected());
        }
        Ok(state.cursors.get(repo).cloned())
    }

    async fn set(&self, repo: &RepoKey, cursor: &CommitId) -> Result<(), PersistenceError> {
        let mut state = lock(&self.state);
        if state.fail_writes {
            return Err(injected());
        }
        state.cursors.insert(repo.clone(), cursor.clone());
        state.writes += 1;
        Ok(())
    }

    async fn tracked(&self) -> Result<Vec<TrackedRepo>, PersistenceError> {
        let state = lock(&self.state);
        if state.fail_reads {
            return Err(injected());
        }
        Ok(state.tracked.clone())
    }
}

// ============================================================================
// Fetcher
// ============================================================================

#[derive(Debug, Default)]
struct FetcherState {
    /// Full history per repository, newest first
    histories: HashMap<RepoKey, Vec<CommitRecord>>,
    /// One-shot failures, consumed before the history is consulted
    failures: HashMap<RepoKey, VecDeque<FetchError>>,
    calls: Vec<(RepoKey, usize)>,
}

/// Fetcher that serves windows from a scripted commit history
///
/// Each call returns the first `limit` commits of the repository's history.
/// Unknown repositories have an empty history.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    state: Mutex<FetcherState>,
}

impl ScriptedFetcher {
    /// Create a fetcher with no histories
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the history of `repo` (newest first)
    pub fn set_history(&self, repo: &RepoKey, history: Vec<CommitRecord>) {
        lock(&self.state).histories.insert(repo.clone(), history);
    }

    /// Add a new head commit to `repo`
    pub fn push_commit(&self, repo: &RepoKey, record: CommitRecord) {
        lock(&self.state)
            .histories
            .entry(repo.clone())
            .or_default()
            .insert(0, record);
    }

    /// Fail the next fetch of `repo` with `error`
    pub fn fail_next(&self, repo: &RepoKey, error: FetchError) {
        lock(&self.state)
            .failures
            .entry(repo.clone())
            .or_default()
            .push_back(error);
    }

    /// Every `(repo, limit)` fetch so far, in call order
    #[must_use]
    pub fn calls(&self) -> Vec<(RepoKey, usize)> {
        lock(&self.state).calls.clone()
    }
}

#[async_trait]
impl CommitFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        repo: &TrackedRepo,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, FetchError> {
        let mut state = lock(&self.state);
        state.calls.push((repo.key.clone(), limit));
        if let Some(error) = state
            .failures
            .get_mut(&repo.key)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(state
            .histories
            .get(&repo.key)
            .map(|h| h.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Repository the commits belong to
    pub repo: RepoKey,
    /// Delivered ids, newest first
    pub ids: Vec<CommitId>,
}

impl Delivery {
    /// Delivered ids as string slices
    #[must_use]
    pub fn id_strs(&self) -> Vec<&str> {
        self.ids.iter().map(CommitId::as_str).collect()
    }
}

#[derive(Debug, Default)]
struct NotifierState {
    deliveries: Vec<Delivery>,
    failure: Option<String>,
}

/// Notifier that records every delivery
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    state: Mutex<NotifierState>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries so far, in order
    #[must_use]
    pub fn deliveries(&self) -> Vec<Delivery> {
        lock(&self.state).deliveries.clone()
    }

    /// Fail every delivery with `message` (still recording it)
    pub fn fail_with(&self, message: impl Into<String>) {
        lock(&self.state).failure = Some(message.into());
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, repo: &TrackedRepo, commits: &NewCommits) -> Result<(), NotifyError> {
        let mut state = lock(&self.state);
        state.deliveries.push(Delivery {
            repo: repo.key.clone(),
            ids: commits.ids().into_iter().cloned().collect(),
        });
        match &state.failure {
            Some(message) => Err(NotifyError::Failed(message.clone())),
            None => Ok(()),
        }
    }
}
