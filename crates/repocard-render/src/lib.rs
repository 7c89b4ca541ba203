// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! repocard-render: Update card rendering for repocard
//!
//! This library crate turns a batch of new commits into an HTML card and a
//! PNG screenshot of it. [`CardNotifier`] plugs the pipeline into the poll
//! loop as a [`repocard_core::Notifier`].

#![warn(missing_docs)]

pub mod background;
pub mod error;
pub mod renderer;
pub mod sample;
pub mod screenshot;
pub mod template;

pub use error::RenderError;
pub use renderer::{CardNotifier, CardOutput, CardRenderer};
pub use sample::{sample_commits, sample_repo};
pub use screenshot::Screenshotter;
pub use template::{CardContext, CommitView, DEFAULT_TEMPLATE};
