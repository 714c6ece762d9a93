//! Media clip references and the candidate pool

use std::path::{Path, PathBuf};

pub mod scan;

pub use scan::scan_folder;

/// Kind of media a clip refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    Video,
    Audio,
}

/// A reference to a playable media file.
///
/// Durations are not stored here; they are probed lazily through
/// [`crate::probe::DurationCache`] so a clip stays immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaClip {
    pub path: PathBuf,
    pub kind: ClipKind,
}

impl MediaClip {
    pub fn video(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ClipKind::Video,
        }
    }

    pub fn audio(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ClipKind::Audio,
        }
    }

    /// File name for log lines, lossily decoded
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// An ordered pool of candidate clips.
///
/// Order is the scan order (lexicographic by file name) and is stable
/// for the whole run, so cyclic filler selection is deterministic. The
/// optional excluded index marks the entry currently being replaced;
/// it is never handed out as a filler.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    clips: Vec<MediaClip>,
    excluded: Option<usize>,
}

impl CandidatePool {
    pub fn new(clips: Vec<MediaClip>) -> Self {
        Self {
            clips,
            excluded: None,
        }
    }

    /// A copy of this pool with a different excluded entry.
    ///
    /// Indices out of range are ignored rather than excluding nothing
    /// silently elsewhere.
    pub fn excluding(&self, index: Option<usize>) -> Self {
        Self {
            clips: self.clips.clone(),
            excluded: index.filter(|&i| i < self.clips.len()),
        }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Number of entries usable as fillers (everything but the excluded one)
    pub fn usable_len(&self) -> usize {
        self.clips.len() - usize::from(self.excluded.is_some())
    }

    pub fn excluded(&self) -> Option<usize> {
        self.excluded
    }

    pub fn get(&self, index: usize) -> Option<&MediaClip> {
        self.clips.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaClip> {
        self.clips.iter()
    }
}

/// True when `path` carries one of `extensions` (lowercase, no dot)
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    crate::utils::path::extension(path)
        .map(|ext| extensions.iter().any(|allowed| *allowed == ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_of(names: &[&str]) -> CandidatePool {
        CandidatePool::new(names.iter().map(|n| MediaClip::video(*n)).collect())
    }

    #[test]
    fn excluding_reduces_usable_len() {
        let pool = pool_of(&["a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(pool.usable_len(), 3);

        let pool = pool.excluding(Some(1));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.usable_len(), 2);
        assert_eq!(pool.excluded(), Some(1));
    }

    #[test]
    fn excluding_out_of_range_is_ignored() {
        let pool = pool_of(&["a.mp4"]).excluding(Some(7));
        assert_eq!(pool.excluded(), None);
        assert_eq!(pool.usable_len(), 1);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let exts = vec!["mp4".to_string(), "mov".to_string()];
        assert!(has_extension(Path::new("clip.MP4"), &exts));
        assert!(has_extension(Path::new("clip.mov"), &exts));
        assert!(!has_extension(Path::new("clip.wav"), &exts));
        assert!(!has_extension(Path::new("clip"), &exts));
    }
}
