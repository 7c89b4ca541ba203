// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for repocard-core collaborators
//!
//! The reconciler itself never fails. These errors come from the fetcher,
//! cursor store and notifier behind the traits in [`crate::contract`].

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned by a commit window fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, TLS, timeout, connection reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials missing, invalid, or lacking access
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Message returned by the remote, if any
        message: String,
    },

    /// Request quota exhausted
    #[error("Rate limited{}", reset_suffix(.reset))]
    RateLimited {
        /// When the quota resets, if the remote said
        reset: Option<DateTime<Utc>>,
    },

    /// Repository or branch does not exist
    #[error("Repository not found: {repo}")]
    NotFound {
        /// The `owner/name` slug that was requested
        repo: String,
    },

    /// Any other non-success status
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Response body could not be decoded as a commit list
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Check if this is a rate limit error
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }

    /// Check if a later attempt could succeed without operator action
    ///
    /// Nothing in this workspace retries within a cycle; the poll loop simply
    /// tries again on its next tick. This is used to pick a log level.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::RateLimited { .. } => true,
            FetchError::Api { status, .. } => *status >= 500,
            FetchError::Unauthorized { .. }
            | FetchError::NotFound { .. }
            | FetchError::MalformedResponse(_) => false,
        }
    }
}

fn reset_suffix(reset: &Option<DateTime<Utc>>) -> String {
    reset.map(|r| format!(", resets at {r}")).unwrap_or_default()
}

/// Errors returned by a cursor store
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// I/O error reading or writing the backing storage
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing storage exists but could not be decoded or encoded
    #[error("Invalid store format: {0}")]
    Format(String),

    /// The repository is not tracked by this store
    #[error("Repository not tracked: {repo}")]
    UnknownRepository {
        /// The `owner/name` slug
        repo: String,
    },
}

/// Errors returned by a change notifier
#[derive(Debug, Error)]
pub enum NotifyError {
    /// I/O error while delivering
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The notifier's own pipeline failed
    #[error("Notification failed: {0}")]
    Failed(String),
}
