//! Path utilities for handling copy-pasted shell paths

use std::path::{Path, PathBuf};

/// Clean a path argument as typed or pasted into a shell.
///
/// Drag-and-dropped paths arrive with backslash-escaped spaces
/// (`/Users/me/My\ Videos`) or wrapped in quotes. Both forms are
/// normalized to a plain path.
pub fn clean_path(raw: &str) -> PathBuf {
    let mut cleaned = raw.replace("\\ ", " ").trim().to_string();

    for quote in ['"', '\''] {
        if cleaned.len() >= 2 && cleaned.starts_with(quote) && cleaned.ends_with(quote) {
            cleaned = cleaned[1..cleaned.len() - 1].to_string();
        }
    }

    PathBuf::from(cleaned)
}

/// Get the file stem of a path as an owned string, falling back to
/// `"output"` for paths with no usable name.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

/// Get the final directory name of a path, falling back to `"output"`.
pub fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

/// Get the lowercase extension of a path, if any.
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_path_strips_escaped_spaces() {
        let path = clean_path("/videos/My\\ Clips/intro.mp4");
        assert_eq!(path, PathBuf::from("/videos/My Clips/intro.mp4"));
    }

    #[test]
    fn clean_path_strips_quotes() {
        assert_eq!(
            clean_path("\"/videos/intro.mp4\""),
            PathBuf::from("/videos/intro.mp4")
        );
        assert_eq!(
            clean_path("'/videos/intro.mp4'"),
            PathBuf::from("/videos/intro.mp4")
        );
    }

    #[test]
    fn clean_path_trims_whitespace() {
        assert_eq!(
            clean_path("  /videos/intro.mp4  "),
            PathBuf::from("/videos/intro.mp4")
        );
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(
            extension(Path::new("/videos/INTRO.MP4")),
            Some("mp4".to_string())
        );
        assert_eq!(extension(Path::new("/videos/noext")), None);
    }
}
