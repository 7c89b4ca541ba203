// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subscription file format
//!
//! ```json
//! {
//!   "GitHub": {
//!     "username": "",
//!     "backgrounds": "false",
//!     "token": "",
//!     "repository": [
//!       { "owner": "octo", "repo": "cards", "branch": "main", "lastsha": "", "description": "" }
//!     ]
//!   }
//! }
//! ```
//!
//! Keys this program does not know about are carried through unchanged, so
//! rewriting a cursor never loses them. An empty `lastsha` means the
//! repository has never been checked.

use repocard_core::{CommitId, RepoKey, TrackedRepo};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whole subscription file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// GitHub section
    #[serde(rename = "GitHub", default)]
    pub github: GithubSettings,
    /// Other top-level sections
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `GitHub` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubSettings {
    /// Informational only
    #[serde(default)]
    pub username: String,
    /// Pick a random card background
    #[serde(default, with = "flag")]
    pub backgrounds: bool,
    /// Personal access token, empty for anonymous access
    #[serde(default)]
    pub token: String,
    /// Subscribed repositories
    #[serde(default)]
    pub repository: Vec<RepositoryEntry>,
    /// Unrecognised keys of the section
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One subscribed repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    /// Repository owner
    #[serde(default)]
    pub owner: String,
    /// Repository name
    #[serde(default)]
    pub repo: String,
    /// Followed branch, empty for the default branch
    #[serde(default)]
    pub branch: String,
    /// Last-seen commit id, empty if never checked
    #[serde(default)]
    pub lastsha: String,
    /// Shown on cards
    #[serde(default)]
    pub description: String,
    /// Unrecognised keys of the entry
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RepositoryEntry {
    /// Create an entry with no cursor
    #[must_use]
    pub fn new(key: &RepoKey, branch: Option<&str>) -> Self {
        Self {
            owner: key.owner.clone(),
            repo: key.name.clone(),
            branch: branch.unwrap_or_default().to_string(),
            ..Default::default()
        }
    }

    /// Whether this entry is for `key`
    #[must_use]
    pub fn matches(&self, key: &RepoKey) -> bool {
        self.owner == key.owner && self.repo == key.name
    }

    /// Repository key
    #[must_use]
    pub fn key(&self) -> RepoKey {
        RepoKey::new(self.owner.clone(), self.repo.clone())
    }

    /// Convert to the poll loop's view
    #[must_use]
    pub fn tracked(&self) -> TrackedRepo {
        let mut repo = TrackedRepo::new(self.key());
        if !self.branch.trim().is_empty() {
            repo = repo.with_branch(self.branch.trim());
        }
        if !self.description.trim().is_empty() {
            repo = repo.with_description(self.description.trim());
        }
        repo
    }

    /// Stored cursor, `None` if empty
    #[must_use]
    pub fn cursor(&self) -> Option<CommitId> {
        CommitId::new(self.lastsha.clone())
    }
}

impl Settings {
    /// Entry for `key`; the first one wins if the file lists it twice
    #[must_use]
    pub fn entry(&self, key: &RepoKey) -> Option<&RepositoryEntry> {
        self.github.repository.iter().find(|e| e.matches(key))
    }

    /// Mutable entry for `key`
    pub fn entry_mut(&mut self, key: &RepoKey) -> Option<&mut RepositoryEntry> {
        self.github.repository.iter_mut().find(|e| e.matches(key))
    }

    /// Subscribed repositories, skipping entries without owner or name
    #[must_use]
    pub fn tracked(&self) -> Vec<TrackedRepo> {
        let mut seen = std::collections::HashSet::new();
        self.github
            .repository
            .iter()
            .filter(|e| !e.owner.is_empty() && !e.repo.is_empty())
            .filter(|e| seen.insert(e.key()))
            .map(RepositoryEntry::tracked)
            .collect()
    }

    /// Stored token, `None` if blank
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        Some(self.github.token.trim()).filter(|t| !t.is_empty())
    }
}

/// `backgrounds` is written as `"true"`/`"false"` but accepted as a bool too
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match BoolOrString::deserialize(deserializer)? {
            BoolOrString::Bool(b) => b,
            BoolOrString::String(s) => s.trim().eq_ignore_ascii_case("true"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const SAMPLE: &str = r#"{
        "GitHub": {
            "username": "octocat",
            "backgrounds": "true",
            "token": "ghp_abc",
            "repository": [
                { "owner": "octo", "repo": "cards", "branch": "main", "lastsha": "abc123", "description": "Cards" },
                { "owner": "octo", "repo": "docs", "lastsha": "" },
                { "owner": "octo", "repo": "cards", "lastsha": "zzz" },
                { "owner": "", "repo": "orphan" }
            ]
        }
    }"#;

    #[test]
    fn test_parse_sample() {
        let settings: Settings = serde_json::from_str(SAMPLE).expect("parse");
        assert!(settings.github.backgrounds);
        assert_eq!(settings.token(), Some("ghp_abc"));

        let tracked = settings.tracked();
        assert_eq!(tracked.len(), 2);
        assert_eq!(tracked[0].branch.as_deref(), Some("main"));
        assert_eq!(tracked[0].description.as_deref(), Some("Cards"));
        assert_eq!(tracked[1].branch, None);
    }

    #[test]
    fn test_duplicate_entry_first_wins() {
        let settings: Settings = serde_json::from_str(SAMPLE).expect("parse");
        let entry = settings.entry(&RepoKey::new("octo", "cards")).expect("entry");
        assert_eq!(entry.cursor().map(String::from), Some("abc123".to_string()));
    }

    #[test]
    fn test_empty_lastsha_is_no_cursor() {
        let settings: Settings = serde_json::from_str(SAMPLE).expect("parse");
        let entry = settings.entry(&RepoKey::new("octo", "docs")).expect("entry");
        assert_eq!(entry.cursor(), None);
    }

    #[test]
    fn test_backgrounds_accepts_bool_and_string() {
        for (raw, expected) in [
            (r#"true"#, true),
            (r#"false"#, false),
            (r#""true""#, true),
            (r#""TRUE""#, true),
            (r#""false""#, false),
            (r#""yes""#, false),
        ] {
            let json = format!(r#"{{"GitHub": {{"backgrounds": {raw}}}}}"#);
            let settings: Settings = serde_json::from_str(&json).expect("parse");
            assert_eq!(settings.github.backgrounds, expected, "{raw}");
        }
    }

    #[test]
    fn test_backgrounds_written_as_string() {
        let mut settings = Settings::default();
        settings.github.backgrounds = true;
        let json = serde_json::to_string(&settings).expect("serialize");
        assert!(json.contains(r#""backgrounds":"true""#));
        assert!(json.contains(r#""GitHub""#));
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let raw = r#"{
            "GitHub": {
                "token": "t",
                "proxy": "http://p:8080",
                "repository": [{ "owner": "o", "repo": "r", "lastsha": "", "note": "keep me" }]
            },
            "Style": { "theme": "dark" }
        }"#;
        let settings: Settings = serde_json::from_str(raw).expect("parse");
        assert_eq!(settings.github.extra["proxy"].as_str(), Some("http://p:8080"));
        assert_eq!(settings.github.repository[0].extra["note"].as_str(), Some("keep me"));

        let written: Value = serde_json::to_value(&settings).expect("serialize");
        assert_eq!(written["Style"]["theme"].as_str(), Some("dark"));
        assert_eq!(written["GitHub"]["proxy"].as_str(), Some("http://p:8080"));
        assert_eq!(written["GitHub"]["repository"][0]["note"].as_str(), Some("keep me"));
    }

    #[test]
    fn test_empty_document() {
        let settings: Settings = serde_json::from_str("{}").expect("parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.token(), None);
    }
}
