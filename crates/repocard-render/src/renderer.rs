// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Card rendering pipeline: template, background, screenshot

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use handlebars::Handlebars;
use repocard_core::{CommitRecord, NewCommits, Notifier, NotifyError, TrackedRepo};
use tracing::info;

use crate::background::pick_background;
use crate::error::RenderError;
use crate::screenshot::Screenshotter;
use crate::template::{CardContext, load_template, render};

/// Files produced for one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOutput {
    /// Rendered page
    pub html: PathBuf,
    /// Screenshot of the page
    pub png: PathBuf,
}

/// Renders update cards for a repository
#[derive(Debug)]
pub struct CardRenderer {
    style_dir: PathBuf,
    output_dir: PathBuf,
    backgrounds: bool,
    hbs: Handlebars<'static>,
    screenshotter: Screenshotter,
}

impl CardRenderer {
    /// Create a renderer; backgrounds are off until enabled
    #[must_use]
    pub fn new(style_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let style_dir = style_dir.into();
        let screenshotter = Screenshotter::new(&style_dir);
        Self {
            style_dir,
            output_dir: output_dir.into(),
            backgrounds: false,
            hbs: Handlebars::new(),
            screenshotter,
        }
    }

    /// Enable or disable random backgrounds
    #[must_use]
    pub fn with_backgrounds(mut self, enabled: bool) -> Self {
        self.backgrounds = enabled;
        self
    }

    /// Replace the screenshot runner
    #[must_use]
    pub fn with_screenshotter(mut self, screenshotter: Screenshotter) -> Self {
        self.screenshotter = screenshotter;
        self
    }

    /// Style directory
    #[must_use]
    pub fn style_dir(&self) -> &Path {
        &self.style_dir
    }

    /// Output directory
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the card files for `repo` go
    #[must_use]
    pub fn output_paths(&self, repo: &TrackedRepo) -> CardOutput {
        let stem = file_stem(repo);
        CardOutput {
            html: self.style_dir.join(format!("rendered_{stem}.html")),
            png: self.output_dir.join(format!("{stem}.png")),
        }
    }

    /// Build the template context, picking a background if enabled
    #[must_use]
    pub fn context(&self, repo: &TrackedRepo, commits: &[CommitRecord]) -> CardContext {
        let background = if self.backgrounds {
            pick_background(&self.style_dir, &mut rand::thread_rng())
        } else {
            None
        };
        CardContext::new(repo, commits).with_background(background)
    }

    /// Render the card page without taking a screenshot
    pub async fn render_html(
        &self,
        repo: &TrackedRepo,
        commits: &[CommitRecord],
    ) -> Result<PathBuf, RenderError> {
        let template = load_template(&self.style_dir).await?;
        let html = render(&self.hbs, &template, &self.context(repo, commits))?;
        let path = self.output_paths(repo).html;
        tokio::fs::create_dir_all(&self.style_dir).await?;
        tokio::fs::write(&path, html).await?;
        Ok(path)
    }

    /// Render the page and screenshot it
    pub async fn render(
        &self,
        repo: &TrackedRepo,
        commits: &[CommitRecord],
    ) -> Result<CardOutput, RenderError> {
        let html = self.render_html(repo, commits).await?;
        let png = self.output_paths(repo).png;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        self.screenshotter.capture(&html, &png).await?;
        info!(repo = %repo.key, commits = commits.len(), png = %png.display(), "Rendered update card");
        Ok(CardOutput { html, png })
    }
}

/// `owner_repo`, with path separators replaced
fn file_stem(repo: &TrackedRepo) -> String {
    format!("{}_{}", repo.key.owner, repo.key.name).replace(['/', '\\'], "_")
}

/// Notifier that renders a card for every batch of new commits
#[derive(Debug)]
pub struct CardNotifier {
    renderer: CardRenderer,
}

impl CardNotifier {
    /// Wrap a renderer
    #[must_use]
    pub fn new(renderer: CardRenderer) -> Self {
        Self { renderer }
    }

    /// The wrapped renderer
    #[must_use]
    pub fn renderer(&self) -> &CardRenderer {
        &self.renderer
    }
}

#[async_trait]
impl Notifier for CardNotifier {
    async fn notify(&self, repo: &TrackedRepo, commits: &NewCommits) -> Result<(), NotifyError> {
        self.renderer.render(repo, commits.as_slice()).await?;
        Ok(())
    }
}
