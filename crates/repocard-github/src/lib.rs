// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! repocard-github: GitHub commit fetcher for repocard
//!
//! This library crate implements [`repocard_core::CommitFetcher`] on top of
//! the GitHub REST API (`GET /repos/{owner}/{repo}/commits`) and normalizes
//! the wire format into [`repocard_core::CommitRecord`]s.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use repocard_core::{CommitFetcher, RepoKey, TrackedRepo};
//! use repocard_github::{GithubConfig, GithubFetcher};
//!
//! # async fn demo() -> Result<(), repocard_core::FetchError> {
//! let fetcher = GithubFetcher::new(GithubConfig::default().with_token("ghp_..."))?;
//! let repo = TrackedRepo::new(RepoKey::new("octo", "cards")).with_branch("main");
//!
//! for commit in fetcher.fetch(&repo, 10).await? {
//!     println!("{} - {}", commit.short_id(), commit.subject());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod wire;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, GithubConfig, GithubFetcher, MAX_PER_PAGE, RateLimit,
    classify_status,
};
pub use wire::{WireCommit, normalize, parse_commits};
