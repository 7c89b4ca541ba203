// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! External screenshot tool
//!
//! Screenshots are taken by `node {style_dir}/screenshot.js <html> <png>
//! <quality>`, a headless-browser script shipped with the style.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::RenderError;

/// Script file name inside the style directory
pub const SCRIPT_FILE: &str = "screenshot.js";

/// Image quality passed to the script
pub const DEFAULT_QUALITY: u8 = 100;

/// Runs the style's screenshot script
#[derive(Debug, Clone)]
pub struct Screenshotter {
    program: OsString,
    script: PathBuf,
    quality: u8,
}

impl Screenshotter {
    /// Use `{style_dir}/screenshot.js` with `node`
    #[must_use]
    pub fn new(style_dir: &Path) -> Self {
        Self {
            program: OsString::from("node"),
            script: style_dir.join(SCRIPT_FILE),
            quality: DEFAULT_QUALITY,
        }
    }

    /// Run the script with a different interpreter
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the quality argument
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Path of the script
    #[must_use]
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Capture `html` into `png`
    pub async fn capture(&self, html: &Path, png: &Path) -> Result<(), RenderError> {
        if !self.script.is_file() {
            return Err(RenderError::ScreenshotScriptMissing {
                path: self.script.clone(),
            });
        }

        debug!(
            script = %self.script.display(),
            html = %html.display(),
            png = %png.display(),
            "Running screenshot script"
        );
        let output = Command::new(&self.program)
            .arg(&self.script)
            .arg(html)
            .arg(png)
            .arg(self.quality.to_string())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(RenderError::ScreenshotFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        info!(png = %png.display(), "Screenshot saved");
        Ok(())
    }
}
