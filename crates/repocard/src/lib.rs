// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! repocard: watch GitHub repositories and render update cards
//!
//! The binary wires the reconciliation engine from [`repocard_core`] to the
//! GitHub fetcher, the JSON subscription file and the card renderer.
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use repocard::config::Config;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::parse_from(["repocard", "list"]);
//! config.validate()?;
//! repocard::commands::run(&config).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod settings;
pub mod store;

pub use config::{Command, Config, ConfigError};
pub use settings::{GithubSettings, RepositoryEntry, Settings};
pub use store::JsonCursorStore;
