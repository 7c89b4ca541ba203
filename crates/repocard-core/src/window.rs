// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fetch windows: bounded, newest-first batches of commits

use crate::commit::CommitRecord;

/// Window size for a regular update check
pub const DEFAULT_WINDOW_LIMIT: usize = 10;

/// Window size used to establish a cursor for a new subscription
pub const ESTABLISH_WINDOW_LIMIT: usize = 1;

/// An ordered batch of the most recent commits, newest first
///
/// The order is exactly the order the remote delivered. It is never re-sorted
/// by id or timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchWindow {
    records: Vec<CommitRecord>,
}

impl FetchWindow {
    /// Wrap records as delivered by the remote
    #[must_use]
    pub fn new(records: Vec<CommitRecord>) -> Self {
        Self { records }
    }

    /// Wrap records, dropping anything past `limit`
    #[must_use]
    pub fn bounded(mut records: Vec<CommitRecord>, limit: usize) -> Self {
        if records.len() > limit {
            tracing::debug!(
                received = records.len(),
                limit,
                "Fetch returned more records than requested, truncating"
            );
            records.truncate(limit);
        }
        Self { records }
    }

    /// An empty window (nothing fetched)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The newest record, if any
    #[must_use]
    pub fn newest(&self) -> Option<&CommitRecord> {
        self.records.first()
    }

    /// Number of records in the window
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the window holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records newest-first
    pub fn iter(&self) -> std::slice::Iter<'_, CommitRecord> {
        self.records.iter()
    }

    /// Borrow the records as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[CommitRecord] {
        &self.records
    }
}

impl From<Vec<CommitRecord>> for FetchWindow {
    fn from(records: Vec<CommitRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a FetchWindow {
    type Item = &'a CommitRecord;
    type IntoIter = std::slice::Iter<'a, CommitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
