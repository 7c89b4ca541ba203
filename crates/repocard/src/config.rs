// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the repocard CLI
//!
//! Command-line flags (with environment fallbacks) choose where the
//! subscription file, the card style and the rendered cards live, and how
//! much gets logged.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Name of the subscription file inside the config directory
pub const SETTINGS_FILE: &str = "config.json";

/// Default polling interval for `monitor`, in minutes
pub const DEFAULT_INTERVAL_MINUTES: u64 = 10;

/// repocard - watch GitHub repositories and render update cards
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "repocard")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (prints help when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding the subscription file (config.json)
    ///
    /// Defaults to the platform config directory, e.g. ~/.config/repocard.
    #[arg(short, long = "config", env = "REPOCARD_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Card style directory (template, screenshot.js, backgrounds/)
    ///
    /// Defaults to ./Style.
    #[arg(short, long, env = "REPOCARD_STYLE_DIR", global = true)]
    pub style: Option<PathBuf>,

    /// Directory for rendered card images
    ///
    /// Defaults to the style directory.
    #[arg(short, long, env = "REPOCARD_OUTPUT_DIR", global = true)]
    pub output: Option<PathBuf>,

    /// GitHub token, overriding the one stored in the subscription file
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so command output on stdout stays clean.
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Subscribe to a repository
    ///
    /// The current head becomes the starting point; existing commits are not
    /// reported.
    Add {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Branch to follow (defaults to the repository's default branch)
        branch: Option<String>,
    },

    /// Check one subscribed repository for new commits now
    Check {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
    },

    /// Poll every subscribed repository until interrupted
    Monitor {
        /// Minutes between checks
        #[arg(default_value_t = DEFAULT_INTERVAL_MINUTES, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },

    /// Store a GitHub token in the subscription file
    SetToken {
        /// Personal access token
        token: String,
    },

    /// List subscribed repositories
    List,

    /// Render a card from sample commits to preview the style
    TestCard,
}

impl Config {
    /// Directory holding the subscription file
    ///
    /// Default location is platform-specific:
    /// - Linux: ~/.config/repocard
    /// - macOS: ~/Library/Application Support/repocard
    /// - Windows: %APPDATA%\repocard
    #[must_use]
    pub fn config_dir_path(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("repocard")
        })
    }

    /// Path of the subscription file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir_path().join(SETTINGS_FILE)
    }

    /// Card style directory
    #[must_use]
    pub fn style_dir(&self) -> PathBuf {
        self.style.clone().unwrap_or_else(|| PathBuf::from("Style"))
    }

    /// Directory for rendered cards
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.style_dir())
    }

    /// Token given on the command line or in the environment, if non-blank
    #[must_use]
    pub fn token_override(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Create the config, style and output directories if missing
    ///
    /// # Errors
    ///
    /// Returns an error if a path exists but is not a directory, or if a
    /// directory cannot be created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dir in [self.config_dir_path(), self.style_dir(), self.output_dir()] {
            if dir.exists() {
                if !dir.is_dir() {
                    return Err(ConfigError::NotADirectory(dir));
                }
                continue;
            }
            std::fs::create_dir_all(&dir)
                .map_err(|e| ConfigError::DirectoryCreateFailed(dir.clone(), e))?;
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Path exists but is a file
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to create a directory
    #[error("Failed to create directory {0}: {1}")]
    DirectoryCreateFailed(PathBuf, std::io::Error),
}
