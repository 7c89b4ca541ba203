// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Cursor store backed by the JSON subscription file
//!
//! Every operation re-reads the file so edits made while `monitor` is running
//! are picked up on the next tick. Writes go through a temporary file in the
//! same directory and are renamed into place.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use repocard_core::{CommitId, CursorStore, PersistenceError, RepoKey, TrackedRepo};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::settings::{RepositoryEntry, Settings};

/// Subscription file used as the cursor store
#[derive(Debug)]
pub struct JsonCursorStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonCursorStore {
    /// Use the file at `path`; it need not exist yet
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file; a missing file is an empty subscription list
    pub fn load(&self) -> Result<Settings, PersistenceError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Subscription file missing, starting empty");
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_json::from_str(&raw)
            .map_err(|e| PersistenceError::Format(format!("{}: {e}", self.path.display())))
    }

    /// Replace the file contents atomically
    pub fn save(&self, settings: &Settings) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| PersistenceError::Format(e.to_string()))?;
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| PersistenceError::Io(e.error))?;
        Ok(())
    }

    /// Subscribe to `key`; returns `false` if it was already subscribed
    pub async fn add_repository(
        &self,
        key: &RepoKey,
        branch: Option<&str>,
    ) -> Result<bool, PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut settings = self.load()?;
        if settings.entry(key).is_some() {
            debug!(repo = %key, "Already subscribed");
            return Ok(false);
        }
        settings
            .github
            .repository
            .push(RepositoryEntry::new(key, branch.map(str::trim).filter(|b| !b.is_empty())));
        self.save(&settings)?;
        info!(repo = %key, "Subscribed");
        Ok(true)
    }

    /// Store a GitHub token
    ///
    /// # Errors
    ///
    /// A blank token is rejected with [`PersistenceError::Format`].
    pub async fn set_token(&self, token: &str) -> Result<(), PersistenceError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PersistenceError::Format("token must not be empty".to_string()));
        }
        let _guard = self.lock.lock().await;
        let mut settings = self.load()?;
        settings.github.token = token.to_string();
        self.save(&settings)
    }

    /// Stored token, if any
    pub async fn token(&self) -> Result<Option<String>, PersistenceError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.token().map(String::from))
    }

    /// Whether random card backgrounds are enabled
    pub async fn backgrounds_enabled(&self) -> Result<bool, PersistenceError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.github.backgrounds)
    }

    /// Subscribed repositories with their cursors
    pub async fn list(&self) -> Result<Vec<(TrackedRepo, Option<CommitId>)>, PersistenceError> {
        let _guard = self.lock.lock().await;
        let settings = self.load()?;
        Ok(settings
            .tracked()
            .into_iter()
            .map(|repo| {
                let cursor = settings.entry(&repo.key).and_then(RepositoryEntry::cursor);
                (repo, cursor)
            })
            .collect())
    }
}

#[async_trait]
impl CursorStore for JsonCursorStore {
    async fn get(&self, repo: &RepoKey) -> Result<Option<CommitId>, PersistenceError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.entry(repo).and_then(RepositoryEntry::cursor))
    }

    async fn set(&self, repo: &RepoKey, cursor: &CommitId) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut settings = self.load()?;
        let entry = settings
            .entry_mut(repo)
            .ok_or_else(|| PersistenceError::UnknownRepository {
                repo: repo.to_string(),
            })?;
        entry.lastsha = cursor.as_str().to_string();
        self.save(&settings)?;
        debug!(repo = %repo, cursor = %cursor.short(), "Cursor saved");
        Ok(())
    }

    async fn tracked(&self) -> Result<Vec<TrackedRepo>, PersistenceError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.tracked())
    }
}
