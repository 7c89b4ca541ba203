// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! repocard-core: Commit reconciliation engine for repocard
//!
//! This library crate decides which remote commits are new since the last
//! check, advances the per-repository cursor, and drives the poll loop that
//! ties a fetcher, a cursor store and a notifier together.

#![warn(missing_docs)]

//! # Example
//!
//! ```
//! use repocard_core::{CommitId, CommitRecord, FetchWindow, reconcile};
//!
//! let ids = ["c3", "c2", "c1"];
//! let window = FetchWindow::new(
//!     ids.iter()
//!         .map(|id| CommitRecord::new(CommitId::new(*id).expect("id")))
//!         .collect(),
//! );
//! let prior = CommitId::new("c1").expect("id");
//!
//! let result = reconcile(&window, Some(&prior));
//! assert_eq!(result.new_commits.len(), 2);
//! assert_eq!(result.next_cursor.as_ref().map(|c| c.as_str()), Some("c3"));
//! ```

pub mod commit;
pub mod contract;
pub mod error;
pub mod poll;
pub mod reconcile;
pub mod repo;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod window;

pub use commit::{CommitId, CommitRecord};
pub use contract::{CommitFetcher, CursorStore, Notifier};
pub use error::{FetchError, NotifyError, PersistenceError};
pub use poll::{
    CycleReport, CycleSummary, DEFAULT_POLL_INTERVAL, PollOptions, PollState, PollTrigger, Poller,
    SkipReason,
};
pub use reconcile::{NewCommits, Reconciliation, reconcile};
pub use repo::{DEFAULT_BRANCH_LABEL, ParseRepoKeyError, RepoKey, TrackedRepo};
pub use window::{DEFAULT_WINDOW_LIMIT, ESTABLISH_WINDOW_LIMIT, FetchWindow};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{CommitId, CommitRecord};
    pub use crate::contract::{CommitFetcher, CursorStore, Notifier};
    pub use crate::error::{FetchError, NotifyError, PersistenceError};
    pub use crate::poll::{CycleReport, PollOptions, Poller};
    pub use crate::reconcile::{NewCommits, reconcile};
    pub use crate::repo::{RepoKey, TrackedRepo};
    pub use crate::window::FetchWindow;
}
