// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command handlers
//!
//! Each subcommand opens the subscription file, builds the collaborators it
//! needs and prints its result to stdout. Logs go to stderr.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use repocard_core::{
    CommitRecord, CursorStore, CycleReport, NewCommits, Notifier, NotifyError, PollOptions,
    Poller, RepoKey, TrackedRepo,
};
use repocard_github::{GithubConfig, GithubFetcher};
use repocard_render::{CardNotifier, CardRenderer, sample_commits, sample_repo};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Command, Config};
use crate::store::JsonCursorStore;

/// Longest commit message shown on the console
pub const MESSAGE_WIDTH: usize = 50;

/// Pause between repositories during `monitor`
pub const MONITOR_SPACING: Duration = Duration::from_secs(1);

// ============================================================================
// Notifiers
// ============================================================================

/// Prints new commits to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, repo: &TrackedRepo, commits: &NewCommits) -> Result<(), NotifyError> {
        println!("{}", format_commits(repo, commits));
        Ok(())
    }
}

/// Delivers to every inner notifier, failing if any of them fails
pub struct FanoutNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    /// Deliver to `notifiers` in order
    #[must_use]
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    async fn notify(&self, repo: &TrackedRepo, commits: &NewCommits) -> Result<(), NotifyError> {
        let mut failures = Vec::new();
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(repo, commits).await {
                warn!(repo = %repo.key, error = %e, "Notifier failed");
                failures.push(e.to_string());
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotifyError::Failed(failures.join("; ")))
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Cut `message` to `width` characters, marking the cut with `...`
#[must_use]
pub fn truncate_message(message: &str, width: usize) -> String {
    if message.chars().count() <= width {
        return message.to_string();
    }
    let cut: String = message.chars().take(width).collect();
    format!("{cut}...")
}

/// One console line per commit
#[must_use]
pub fn format_commit(record: &CommitRecord) -> String {
    let mut line = format!(
        "  {} {}",
        record.short_id(),
        truncate_message(record.subject(), MESSAGE_WIDTH)
    );
    if !record.author().is_empty() {
        line.push_str(&format!(" ({})", record.author()));
    }
    if let Some(ts) = record.timestamp() {
        line.push_str(&format!(" {}", ts.format("%Y-%m-%d %H:%M")));
    }
    line
}

/// Header plus one line per commit
#[must_use]
pub fn format_commits(repo: &TrackedRepo, commits: &NewCommits) -> String {
    let noun = if commits.len() == 1 { "commit" } else { "commits" };
    let mut out = format!(
        "{} new {noun} in {} ({}):",
        commits.len(),
        repo.key,
        repo.branch_label()
    );
    for record in commits {
        out.push('\n');
        out.push_str(&format_commit(record));
    }
    out
}

/// One-line outcome of a repository check
#[must_use]
pub fn format_report(repo: &RepoKey, report: &CycleReport) -> String {
    match report {
        CycleReport::Unchanged => format!("{repo}: no new commits"),
        CycleReport::Established(cursor) => {
            format!("{repo}: tracking from {}", cursor.short())
        }
        CycleReport::Updated {
            count,
            truncated,
            delivered,
        } => {
            let mut line = format!("{repo}: {count} new");
            if *truncated {
                line.push_str(", earlier commits may have been missed");
            }
            if !delivered {
                line.push_str(", card not rendered");
            }
            line
        }
        CycleReport::Skipped(reason) => format!("{repo}: skipped ({reason})"),
    }
}

/// `owner/repo  branch  cursor` for `list`
#[must_use]
pub fn format_listing(repo: &TrackedRepo, cursor: Option<&str>) -> String {
    format!(
        "{}  branch={}  lastsha={}",
        repo.key,
        repo.branch_label(),
        cursor.unwrap_or("-")
    )
}

// ============================================================================
// Wiring
// ============================================================================

/// Token from the command line, falling back to the subscription file
async fn resolve_token(
    config: &Config,
    store: &JsonCursorStore,
) -> anyhow::Result<Option<String>> {
    if let Some(token) = config.token_override() {
        return Ok(Some(token.to_string()));
    }
    Ok(store.token().await?)
}

async fn fetcher(config: &Config, store: &JsonCursorStore) -> anyhow::Result<GithubFetcher> {
    let mut github = GithubConfig::default();
    if let Some(token) = resolve_token(config, store).await? {
        github = github.with_token(token);
    }
    Ok(GithubFetcher::new(github)?)
}

async fn card_renderer(config: &Config, store: &JsonCursorStore) -> anyhow::Result<CardRenderer> {
    Ok(CardRenderer::new(config.style_dir(), config.output_dir())
        .with_backgrounds(store.backgrounds_enabled().await?))
}

async fn poller(config: &Config, store: Arc<JsonCursorStore>) -> anyhow::Result<Poller> {
    let fetcher = Arc::new(fetcher(config, &store).await?);
    let cards = Arc::new(CardNotifier::new(card_renderer(config, &store).await?));
    let notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(ConsoleNotifier), cards];
    Ok(Poller::new(fetcher, store, Arc::new(FanoutNotifier::new(notifiers))))
}

fn repo_key(owner: &str, repo: &str) -> anyhow::Result<RepoKey> {
    let (owner, repo) = (owner.trim(), repo.trim());
    if owner.is_empty() || repo.is_empty() {
        bail!("Owner and repository name must not be empty");
    }
    Ok(RepoKey::new(owner, repo))
}

// ============================================================================
// Handlers
// ============================================================================

/// Run the selected subcommand
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let store = Arc::new(JsonCursorStore::open(config.settings_path()));
    match &config.command {
        Some(Command::Add {
            owner,
            repo,
            branch,
        }) => add(config, store, owner, repo, branch.as_deref()).await,
        Some(Command::Check { owner, repo }) => check(config, store, owner, repo).await,
        Some(Command::Monitor { interval }) => monitor(config, store, *interval).await,
        Some(Command::SetToken { token }) => set_token(&store, token).await,
        Some(Command::List) => list(&store).await,
        Some(Command::TestCard) => test_card(config, &store).await,
        None => {
            use clap::CommandFactory;
            Config::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

async fn add(
    config: &Config,
    store: Arc<JsonCursorStore>,
    owner: &str,
    repo: &str,
    branch: Option<&str>,
) -> anyhow::Result<()> {
    let key = repo_key(owner, repo)?;
    if !store.add_repository(&key, branch).await? {
        println!("{key} is already subscribed");
        return Ok(());
    }

    let tracked = store
        .tracked()
        .await?
        .into_iter()
        .find(|r| r.key == key)
        .with_context(|| format!("{key} missing after subscribing"))?;
    let poller = poller(config, Arc::clone(&store)).await?;
    let report = poller.establish(&tracked).await;
    if let CycleReport::Skipped(reason) = &report {
        warn!(repo = %key, %reason, "Could not read current head; it will be set on the next check");
    }
    println!("Subscribed to {key} ({})", tracked.branch_label());
    println!("{}", format_report(&key, &report));
    Ok(())
}

async fn check(
    config: &Config,
    store: Arc<JsonCursorStore>,
    owner: &str,
    repo: &str,
) -> anyhow::Result<()> {
    let key = repo_key(owner, repo)?;
    let Some(tracked) = store.tracked().await?.into_iter().find(|r| r.key == key) else {
        bail!("{key} is not subscribed. Add it with 'repocard add {} {}'", key.owner, key.name);
    };

    let poller = poller(config, Arc::clone(&store)).await?;
    let report = poller.check_repository(&tracked).await;
    println!("{}", format_report(&key, &report));
    if let CycleReport::Skipped(reason) = report {
        bail!("Check failed: {reason}");
    }
    Ok(())
}

async fn monitor(config: &Config, store: Arc<JsonCursorStore>, minutes: u64) -> anyhow::Result<()> {
    let options = PollOptions::default()
        .with_interval(Duration::from_secs(minutes.saturating_mul(60)))
        .with_spacing(MONITOR_SPACING);
    let poller = poller(config, Arc::clone(&store)).await?.with_options(options);

    let cancel = CancellationToken::new();
    let signals = tokio::spawn(shutdown_on_signal(cancel.clone()));

    info!(interval_minutes = minutes, file = %store.path().display(), "Monitoring subscriptions. Press Ctrl+C to stop.");
    let ticks = poller.run(cancel).await;
    signals.abort();
    info!(ticks, "Monitor stopped");
    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM
async fn shutdown_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => warn!("SIGINT received"),
                    _ = sigterm.recv() => warn!("SIGTERM received"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    token.cancel();
}

async fn set_token(store: &JsonCursorStore, token: &str) -> anyhow::Result<()> {
    store
        .set_token(token)
        .await
        .context("Could not store token")?;
    println!("Token saved to {}", store.path().display());
    Ok(())
}

async fn list(store: &JsonCursorStore) -> anyhow::Result<()> {
    let entries = store.list().await?;
    if entries.is_empty() {
        println!("No subscriptions. Add one with 'repocard add <owner> <repo>'");
        return Ok(());
    }
    for (repo, cursor) in &entries {
        println!("{}", format_listing(repo, cursor.as_ref().map(|c| c.as_str())));
    }
    Ok(())
}

async fn test_card(config: &Config, store: &JsonCursorStore) -> anyhow::Result<()> {
    let renderer = card_renderer(config, store).await?;
    let commits = sample_commits();
    let output = renderer
        .render(&sample_repo(), commits.as_slice())
        .await
        .context("Test card failed")?;
    println!("Rendered {}", output.html.display());
    println!("Saved {}", output.png.display());
    Ok(())
}
