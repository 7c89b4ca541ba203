// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Random card backgrounds from `{style_dir}/backgrounds`

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Subdirectory of the style directory holding background images
pub const BACKGROUNDS_DIR: &str = "backgrounds";

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Image files in `dir`, sorted by name
///
/// A missing or unreadable directory yields an empty list.
#[must_use]
pub fn list_backgrounds(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        debug!(dir = %dir.display(), "Background directory not readable");
        return Vec::new();
    };

    let mut images: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    images.sort();
    images
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)))
}

/// Pick a background and return its path relative to the style directory
///
/// Returns `None` when the style directory has no images.
pub fn pick_background<R: Rng + ?Sized>(style_dir: &Path, rng: &mut R) -> Option<String> {
    let images = list_backgrounds(&style_dir.join(BACKGROUNDS_DIR));
    let chosen = images.choose(rng)?;
    let name = chosen.file_name()?.to_str()?;
    debug!(background = name, "Picked card background");
    Some(format!("{BACKGROUNDS_DIR}/{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use similar_asserts::assert_eq;

    fn style_with(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let bg = dir.path().join(BACKGROUNDS_DIR);
        std::fs::create_dir(&bg).expect("mkdir");
        for f in files {
            std::fs::write(bg.join(f), b"img").expect("write");
        }
        dir
    }

    #[test]
    fn test_lists_only_images_case_insensitive() {
        let dir = style_with(&["a.JPG", "b.png", "c.txt", "d.Gif", "e.jpeg", "noext"]);
        let names: Vec<String> = list_backgrounds(&dir.path().join(BACKGROUNDS_DIR))
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "d.Gif", "e.jpeg"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(list_backgrounds(&dir.path().join("nope")).is_empty());
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_background(dir.path(), &mut rng), None);
    }

    #[test]
    fn test_pick_is_relative_to_style_dir() {
        let dir = style_with(&["sky.png"]);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            pick_background(dir.path(), &mut rng),
            Some("backgrounds/sky.png".to_string())
        );
    }

    #[test]
    fn test_pick_covers_all_images() {
        let dir = style_with(&["a.png", "b.png", "c.png"]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(pick_background(dir.path(), &mut rng).expect("pick"));
        }
        assert_eq!(seen.len(), 3);
    }
}
