// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Collaborator interfaces used by the poll loop
//!
//! Implementations live in other crates: the GitHub fetcher, the JSON
//! subscription file, and the card renderer. In-memory versions for tests are
//! in the `testing` module, behind the `testing` feature.

use async_trait::async_trait;

use crate::commit::{CommitId, CommitRecord};
use crate::error::{FetchError, NotifyError, PersistenceError};
use crate::reconcile::NewCommits;
use crate::repo::{RepoKey, TrackedRepo};

/// Fetches the most recent commits of a repository
#[async_trait]
pub trait CommitFetcher: Send + Sync {
    /// Return up to `limit` commits, newest first
    ///
    /// An empty repository yields an empty vector, not an error.
    async fn fetch(&self, repo: &TrackedRepo, limit: usize)
    -> Result<Vec<CommitRecord>, FetchError>;
}

/// Durable per-repository cursor storage
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// The last-seen commit id, or `None` if the repository was never checked
    async fn get(&self, repo: &RepoKey) -> Result<Option<CommitId>, PersistenceError>;

    /// Overwrite the cursor for `repo`
    ///
    /// Must be durable when this returns `Ok`.
    async fn set(&self, repo: &RepoKey, cursor: &CommitId) -> Result<(), PersistenceError>;

    /// The repositories currently subscribed
    async fn tracked(&self) -> Result<Vec<TrackedRepo>, PersistenceError>;
}

/// Receives commits detected by a reconciliation cycle
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a non-empty batch of new commits, newest first
    async fn notify(&self, repo: &TrackedRepo, commits: &NewCommits) -> Result<(), NotifyError>;
}
