// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! File naming helpers for saved frames.

use std::path::{Path, PathBuf};

const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "3gp", "ogv", "ts", "mts",
];

/// Replace characters that are not allowed in file names.
pub fn safe_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `dir/base.ext`, or `dir/base_N.ext` with the first free N.
pub fn unique_filename(dir: &Path, base: &str, extension: &str) -> PathBuf {
    let candidate = dir.join(format!("{base}.{extension}"));
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| dir.join(format!("{base}_{n}.{extension}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("test<>:\"/\\|?*file.txt"), "test_________file.txt");
        assert_eq!(safe_filename("  test  "), "test");
        assert_eq!(safe_filename("...test..."), "test");
        assert_eq!(safe_filename("   "), "untitled");
        assert_eq!(safe_filename("normal_file.txt"), "normal_file.txt");
    }

    #[test]
    fn test_unique_filename_adds_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_filename(dir.path(), "shot", "png");
        assert_eq!(first, dir.path().join("shot.png"));

        std::fs::write(&first, b"x").unwrap();
        let second = unique_filename(dir.path(), "shot", "png");
        assert_eq!(second, dir.path().join("shot_1.png"));

        std::fs::write(&second, b"x").unwrap();
        assert_eq!(unique_filename(dir.path(), "shot", "png"), dir.path().join("shot_2.png"));
    }

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("clip.mp4")));
        assert!(is_video_file(Path::new("Movie.AVI")));
        assert!(!is_video_file(Path::new("frame.png")));
        assert!(!is_video_file(Path::new("noext")));
    }
}
