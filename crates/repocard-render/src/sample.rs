// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Demo data for previewing a card style

use chrono::{TimeZone, Utc};
use repocard_core::{CommitId, CommitRecord, NewCommits, RepoKey, TrackedRepo};

/// Repository used by the demo card
#[must_use]
pub fn sample_repo() -> TrackedRepo {
    TrackedRepo::new(RepoKey::new("TestOwner", "TestRepo"))
        .with_branch("main")
        .with_description("Sample repository for previewing card styles.")
}

/// Three demo commits, newest first
#[must_use]
pub fn sample_commits() -> NewCommits {
    let samples = [
        (
            "abcdef1234567890",
            (2026, 5, 30, 12, 0),
            "TestAuthor1",
            "feat: add a shiny new feature",
            1,
        ),
        (
            "fedcba0987654321",
            (2026, 5, 29, 10, 30),
            "TestAuthor2",
            "fix: resolve an important bug",
            2,
        ),
        (
            "12345fedcba09876",
            (2026, 5, 28, 8, 15),
            "TestAuthor1",
            "docs: update the guide and tidy up",
            1,
        ),
    ];

    samples
        .into_iter()
        .filter_map(|(sha, (y, mo, d, h, mi), author, message, avatar)| {
            let id = CommitId::new(sha)?;
            let mut record = CommitRecord::new(id)
                .with_author(author)
                .with_message(message)
                .with_url(format!("https://github.com/TestOwner/TestRepo/commit/{sha}"))
                .with_avatar_url(format!("https://avatars.githubusercontent.com/u/{avatar}?v=4"));
            if let Some(ts) = Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single() {
                record = record.with_timestamp(ts);
            }
            Some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_commits() {
        let commits = sample_commits();
        assert_eq!(commits.len(), 3);
        assert!(commits.iter().all(|c| c.timestamp().is_some()));
        assert_eq!(commits.as_slice()[0].repo_slug(), "TestOwner/TestRepo");
    }
}
