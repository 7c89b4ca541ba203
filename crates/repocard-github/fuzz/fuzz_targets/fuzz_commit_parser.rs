// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the GitHub commit list parser
//!
//! This fuzzes `parse_commits`, which decodes the body of
//! `GET /repos/{owner}/{repo}/commits`.

#![no_main]

use libfuzzer_sys::fuzz_target;

use repocard_github::parse_commits;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must never panic, and every record it returns must have an id
        if let Ok(records) = parse_commits(input) {
            for record in &records {
                assert!(!record.id().as_str().is_empty());
            }
        }
    }
});
