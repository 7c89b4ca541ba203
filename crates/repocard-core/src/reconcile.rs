// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Cursor reconciliation
//!
//! [`reconcile`] compares a freshly fetched [`FetchWindow`] against the
//! previously persisted cursor and decides which commits are new and where the
//! cursor moves next. It is a pure function: no I/O, no shared state, and no
//! failure modes.
//!
//! Commits are matched by position in the window only. Remote ids have no
//! total order and commit timestamps are not monotonic across rebases, so the
//! scan walks the window newest-first and stops at the previous cursor.

use std::collections::HashSet;

use crate::commit::{CommitId, CommitRecord};
use crate::window::FetchWindow;

/// Newly detected commits, newest first, without duplicate ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCommits {
    records: Vec<CommitRecord>,
    seen: HashSet<CommitId>,
}

impl NewCommits {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, ignoring it if its id is already present
    ///
    /// Returns `true` if the record was added.
    pub fn push(&mut self, record: CommitRecord) -> bool {
        if self.seen.contains(record.id()) {
            return false;
        }
        self.seen.insert(record.id().clone());
        self.records.push(record);
        true
    }

    /// Number of commits
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no commits were found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a commit with this id is present
    #[must_use]
    pub fn contains(&self, id: &CommitId) -> bool {
        self.seen.contains(id)
    }

    /// Iterate commits newest-first
    pub fn iter(&self) -> std::slice::Iter<'_, CommitRecord> {
        self.records.iter()
    }

    /// Ids in window order
    #[must_use]
    pub fn ids(&self) -> Vec<&CommitId> {
        self.records.iter().map(CommitRecord::id).collect()
    }

    /// Borrow the commits as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[CommitRecord] {
        &self.records
    }
}

impl FromIterator<CommitRecord> for NewCommits {
    fn from_iter<I: IntoIterator<Item = CommitRecord>>(iter: I) -> Self {
        let mut commits = Self::new();
        for record in iter {
            commits.push(record);
        }
        commits
    }
}

impl<'a> IntoIterator for &'a NewCommits {
    type Item = &'a CommitRecord;
    type IntoIter = std::slice::Iter<'a, CommitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Outcome of reconciling one window against a cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Commits not seen before, newest first
    pub new_commits: NewCommits,
    /// Cursor value to persist
    pub next_cursor: Option<CommitId>,
    /// The previous cursor was not found anywhere in the window
    pub truncated: bool,
}

impl Reconciliation {
    /// The cursor was absent before and is now set
    #[must_use]
    pub fn is_established(&self, prior: Option<&CommitId>) -> bool {
        prior.is_none() && self.next_cursor.is_some()
    }

    /// Whether the caller should write `next_cursor` to the store
    ///
    /// True when new commits were found or a cursor was newly established.
    #[must_use]
    pub fn should_persist(&self, prior: Option<&CommitId>) -> bool {
        self.next_cursor.is_some() && (!self.new_commits.is_empty() || self.is_established(prior))
    }
}

/// Reconcile a fetched window against the prior cursor
///
/// - No prior cursor: the newest commit becomes the cursor and nothing is
///   reported, so first contact never floods notifications with old history.
/// - Prior cursor found in the window: every commit above it is new.
/// - Prior cursor missing from the window: the whole window is new and the
///   result is flagged `truncated`.
///
/// The next cursor is the newest commit of a non-empty window; an empty window
/// leaves the cursor unchanged.
#[must_use]
pub fn reconcile(window: &FetchWindow, prior: Option<&CommitId>) -> Reconciliation {
    let next_cursor = window
        .newest()
        .map(|c| c.id().clone())
        .or_else(|| prior.cloned());

    let Some(prior) = prior else {
        return Reconciliation {
            new_commits: NewCommits::new(),
            next_cursor,
            truncated: false,
        };
    };

    let mut new_commits = NewCommits::new();
    let mut found = false;
    for record in window {
        if record.id() == prior {
            found = true;
            break;
        }
        new_commits.push(record.clone());
    }

    // An empty window cannot contain the cursor, but it is not a truncation
    let truncated = !found && !window.is_empty();
    if truncated {
        tracing::debug!(
            prior = %prior,
            window = window.len(),
            "Prior cursor outside fetched window"
        );
    }

    Reconciliation {
        new_commits,
        next_cursor,
        truncated,
    }
}
