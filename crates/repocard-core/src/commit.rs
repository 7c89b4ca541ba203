// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit record types
//!
//! A [`CommitRecord`] is the normalized, immutable form of one remote commit.
//! Records are compared by [`CommitId`] only; everything else is display
//! metadata.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque commit identifier (the remote's commit hash)
///
/// Never empty. Identifiers carry no ordering: two ids can only be compared
/// for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Create an id, rejecting empty or whitespace-only input
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.len() == id.len() {
            Some(Self(id))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Borrow the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the short id (first 7 characters)
    #[must_use]
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(7) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CommitId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "commit id must not be empty".to_string())
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A normalized remote commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    id: CommitId,
    timestamp: Option<DateTime<Utc>>,
    author: String,
    message: String,
    url: String,
    avatar_url: String,
}

impl CommitRecord {
    /// Create a record with the given id and empty display metadata
    #[must_use]
    pub fn new(id: CommitId) -> Self {
        Self {
            id,
            timestamp: None,
            author: String::new(),
            message: String::new(),
            url: String::new(),
            avatar_url: String::new(),
        }
    }

    /// Set the commit timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the author display name
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the commit message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the web URL of the commit
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the author's avatar URL
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = avatar_url.into();
        self
    }

    /// The commit id
    #[must_use]
    pub fn id(&self) -> &CommitId {
        &self.id
    }

    /// Commit time, for display only
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Author display name (may be empty)
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Full commit message (may be empty)
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Web URL of the commit (may be empty)
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Avatar URL of the author (may be empty)
    #[must_use]
    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    /// Get the short id (first 7 characters)
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.short()
    }

    /// Get the first line of the commit message (subject)
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// `owner/repo` parsed from a `github.com/<owner>/<repo>/...` URL
    ///
    /// Returns an empty string when the URL does not have that shape.
    #[must_use]
    pub fn repo_slug(&self) -> String {
        let Some(start) = self.url.find("github.com/") else {
            return String::new();
        };
        let mut parts = self.url[start + "github.com/".len()..].split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), Some(_)) if !owner.is_empty() && !repo.is_empty() => {
                format!("{owner}/{repo}")
            }
            _ => String::new(),
        }
    }
}

impl PartialEq for CommitRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CommitRecord {}

impl Hash for CommitRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
