// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository identity types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a repository on the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoKey {
    /// Account or organization that owns the repository
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoKey {
    /// Create a key from owner and repository name
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Error parsing a `owner/name` repository slug
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid repository slug '{0}', expected owner/name")]
pub struct ParseRepoKeyError(pub String);

impl FromStr for RepoKey {
    type Err = ParseRepoKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ParseRepoKeyError(s.to_string())),
        }
    }
}

/// Shown instead of a branch name when following the default branch
pub const DEFAULT_BRANCH_LABEL: &str = "default";

/// A subscribed repository with its fetch and display settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRepo {
    /// Repository identity
    pub key: RepoKey,
    /// Branch to follow (the remote's default branch when `None`)
    pub branch: Option<String>,
    /// Free-form description shown on rendered cards
    pub description: Option<String>,
}

impl TrackedRepo {
    /// Track a repository on its default branch
    #[must_use]
    pub fn new(key: RepoKey) -> Self {
        Self {
            key,
            branch: None,
            description: None,
        }
    }

    /// Follow a specific branch
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Branch name for display, [`DEFAULT_BRANCH_LABEL`] when unset
    ///
    /// An unset branch follows whatever the remote's default branch is, so no
    /// concrete name is assumed.
    #[must_use]
    pub fn branch_label(&self) -> &str {
        self.branch
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BRANCH_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_display() {
        assert_eq!(RepoKey::new("octo", "cards").to_string(), "octo/cards");
    }

    #[test]
    fn test_parse_valid() {
        let key: RepoKey = "octo/cards".parse().expect("parse");
        assert_eq!(key, RepoKey::new("octo", "cards"));
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "octo", "/cards", "octo/", "a/b/c"] {
            assert!(bad.parse::<RepoKey>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_tracked_repo_branch_label() {
        let repo = TrackedRepo::new(RepoKey::new("octo", "cards"));
        assert_eq!(repo.branch_label(), DEFAULT_BRANCH_LABEL);
        assert_ne!(repo.branch_label(), "main");
        assert_eq!(repo.clone().with_branch("").branch_label(), DEFAULT_BRANCH_LABEL);
        assert_eq!(repo.with_branch("trunk").branch_label(), "trunk");
    }
}
