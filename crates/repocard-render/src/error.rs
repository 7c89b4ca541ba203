// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for repocard-render

use std::path::PathBuf;

use repocard_core::NotifyError;
use thiserror::Error;

/// Errors that can occur while rendering a card
#[derive(Debug, Error)]
pub enum RenderError {
    /// I/O error reading the template or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Handlebars failed to parse or render the template
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// `screenshot.js` is not in the style directory
    #[error("Screenshot script not found: {path}")]
    ScreenshotScriptMissing {
        /// Where the script was expected
        path: PathBuf,
    },

    /// The screenshot tool exited unsuccessfully
    #[error("Screenshot failed (exit code {code:?}): {stderr}")]
    ScreenshotFailed {
        /// Process exit code, `None` if killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },
}

impl From<RenderError> for NotifyError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(e) => NotifyError::Io(e),
            other => NotifyError::Failed(other.to_string()),
        }
    }
}
