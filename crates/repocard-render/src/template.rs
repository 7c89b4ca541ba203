// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Card template context and rendering
//!
//! A style directory may ship its own `index.html`; otherwise the embedded
//! default card is used. Templates are Handlebars, rendered with HTML escaping
//! so commit messages cannot inject markup.

use std::path::Path;

use chrono::{DateTime, Local, Utc};
use handlebars::Handlebars;
use repocard_core::{CommitRecord, TrackedRepo};
use serde::Serialize;
use tracing::debug;

use crate::error::RenderError;

/// The built-in card template
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/card.html");

/// File name of a style directory's template override
pub const TEMPLATE_FILE: &str = "index.html";

/// Lists this short or shorter get the `few-commits` class
const FEW_COMMITS: usize = 2;

/// Lists this long or longer get the `many-commits` class
const MANY_COMMITS: usize = 6;

/// One commit as shown on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitView {
    /// Full message
    pub message: String,
    /// First line of the message
    pub subject: String,
    /// Abbreviated hash
    pub short_sha: String,
    /// Author display name
    pub author: String,
    /// Commit time, `YYYY-MM-DD HH:MM` UTC, or empty
    pub date: String,
    /// Web URL of the commit
    pub url: String,
    /// Author avatar URL
    pub avatar_url: String,
}

impl From<&CommitRecord> for CommitView {
    fn from(record: &CommitRecord) -> Self {
        Self {
            message: record.message().to_string(),
            subject: record.subject().to_string(),
            short_sha: record.short_id().to_string(),
            author: record.author().to_string(),
            date: record
                .timestamp()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            url: record.url().to_string(),
            avatar_url: record.avatar_url().to_string(),
        }
    }
}

/// Everything a card template can reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardContext {
    /// Page title
    pub title: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Followed branch
    pub branch: String,
    /// Repository description, may be empty
    pub description: String,
    /// Number of commits on the card
    pub commit_count: usize,
    /// Exactly one commit (for pluralisation)
    pub single_commit: bool,
    /// Local render time, `%Y-%m-%d %H:%M:%S`
    pub current_date: String,
    /// Date of the newest commit, `%Y-%m-%d`, may be empty
    pub last_update: String,
    /// Background path relative to the style directory, may be empty
    pub background_image: String,
    /// `few-commits`, `many-commits`, or empty
    pub commit_list_class: String,
    /// Commits, newest first
    pub commits: Vec<CommitView>,
}

impl CardContext {
    /// Build the context for `repo` and its new commits
    #[must_use]
    pub fn new(repo: &TrackedRepo, commits: &[CommitRecord]) -> Self {
        Self::at(repo, commits, Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    }

    /// Build the context with a fixed render time
    #[must_use]
    pub fn at(repo: &TrackedRepo, commits: &[CommitRecord], current_date: String) -> Self {
        let last_update = commits
            .first()
            .and_then(CommitRecord::timestamp)
            .map(|t: DateTime<Utc>| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        Self {
            title: format!("{} updates", repo.key),
            owner: repo.key.owner.clone(),
            repo: repo.key.name.clone(),
            branch: repo.branch_label().to_string(),
            description: repo.description.clone().unwrap_or_default(),
            commit_count: commits.len(),
            single_commit: commits.len() == 1,
            current_date,
            last_update,
            background_image: String::new(),
            commit_list_class: commit_list_class(commits.len()).to_string(),
            commits: commits.iter().map(CommitView::from).collect(),
        }
    }

    /// Set the background image path
    #[must_use]
    pub fn with_background(mut self, background: Option<String>) -> Self {
        self.background_image = background.unwrap_or_default();
        self
    }
}

/// CSS class for a commit list of `count` entries
#[must_use]
pub fn commit_list_class(count: usize) -> &'static str {
    if count <= FEW_COMMITS {
        "few-commits"
    } else if count >= MANY_COMMITS {
        "many-commits"
    } else {
        ""
    }
}

/// Read `{style_dir}/index.html`, falling back to the embedded template
pub async fn load_template(style_dir: &Path) -> Result<String, RenderError> {
    let path = style_dir.join(TEMPLATE_FILE);
    if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
        debug!(path = %path.display(), "Loading card template from style directory");
        return Ok(tokio::fs::read_to_string(&path).await?);
    }
    debug!("Using embedded card template");
    Ok(DEFAULT_TEMPLATE.to_string())
}

/// Render `template` with `context`
pub fn render(
    hbs: &Handlebars<'_>,
    template: &str,
    context: &CardContext,
) -> Result<String, RenderError> {
    Ok(hbs.render_template(template, context)?)
}
