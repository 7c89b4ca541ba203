// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! repocard: watch GitHub repositories and render update cards for new commits

use clap::Parser;
use repocard::commands;
use repocard::config::Config;
use tracing::debug;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    }
    debug!(settings = %config.settings_path().display(), "Configuration loaded");

    if let Err(e) = commands::run(&config).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
