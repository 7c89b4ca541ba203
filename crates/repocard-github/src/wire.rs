// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! GitHub commit list wire format
//!
//! The body of `GET /repos/{owner}/{repo}/commits` is a JSON array of commit
//! objects. Only the fields shown on a card are decoded:
//!
//! ```json
//! [{
//!   "sha": "1945ab9c...",
//!   "html_url": "https://github.com/octo/cards/commit/1945ab9c...",
//!   "commit": {
//!     "message": "feat: dark theme",
//!     "author": { "name": "Octo Cat", "date": "2026-01-17T02:33:06Z" },
//!     "committer": { "name": "GitHub", "date": "2026-01-17T02:33:06Z" }
//!   },
//!   "author": { "login": "octocat", "avatar_url": "https://..." }
//! }]
//! ```
//!
//! Every field is optional on the wire. `author` is `null` when the commit
//! email does not map to a GitHub account.

use chrono::{DateTime, Utc};
use repocard_core::{CommitId, CommitRecord, FetchError};
use serde::Deserialize;
use tracing::debug;

/// One element of the commit list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireCommit {
    /// Commit hash
    #[serde(default)]
    pub sha: Option<String>,
    /// Web URL of the commit
    #[serde(default)]
    pub html_url: Option<String>,
    /// Git-level commit data
    #[serde(default)]
    pub commit: Option<WireCommitDetail>,
    /// GitHub account of the author, if linked
    #[serde(default)]
    pub author: Option<WireUser>,
}

/// Git-level commit data
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireCommitDetail {
    /// Full commit message
    #[serde(default)]
    pub message: Option<String>,
    /// Git author signature
    #[serde(default)]
    pub author: Option<WireSignature>,
    /// Git committer signature
    #[serde(default)]
    pub committer: Option<WireSignature>,
}

/// Name and date from a git signature
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireSignature {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub date: Option<String>,
}

/// GitHub account summary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireUser {
    /// Account login
    #[serde(default)]
    pub login: Option<String>,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Parse a commit list body into records, newest first
///
/// A body that is not a JSON array is a [`FetchError::MalformedResponse`].
/// Array elements that are not commit objects, or that lack a `sha`, are
/// dropped.
pub fn parse_commits(body: &str) -> Result<Vec<CommitRecord>, FetchError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("expected commit array: {e}")))?;

    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<WireCommit>(value) {
            Ok(wire) => {
                if let Some(record) = normalize(wire) {
                    records.push(record);
                } else {
                    debug!(index, "Dropping commit without sha");
                }
            }
            Err(e) => debug!(index, error = %e, "Dropping undecodable commit entry"),
        }
    }
    Ok(records)
}

/// Convert one wire commit to a record
///
/// Returns `None` when the sha is missing or blank.
#[must_use]
pub fn normalize(wire: WireCommit) -> Option<CommitRecord> {
    let id = CommitId::new(wire.sha?)?;
    let detail = wire.commit.unwrap_or_default();
    let user = wire.author.unwrap_or_default();

    let author = user
        .login
        .filter(|l| !l.is_empty())
        .or_else(|| detail.author.as_ref().and_then(|a| a.name.clone()))
        .unwrap_or_default();

    let mut record = CommitRecord::new(id)
        .with_author(author)
        .with_message(detail.message.unwrap_or_default())
        .with_url(wire.html_url.unwrap_or_default())
        .with_avatar_url(user.avatar_url.unwrap_or_default());

    if let Some(timestamp) = detail
        .committer
        .and_then(|c| c.date)
        .and_then(|d| parse_timestamp(&d))
    {
        record = record.with_timestamp(timestamp);
    }
    Some(record)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            debug!(date = s, error = %e, "Unparseable commit date");
            None
        }
    }
}

/// Extract the `message` field from a GitHub error body
///
/// Falls back to the trimmed body when it is not a JSON object.
#[must_use]
pub fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
