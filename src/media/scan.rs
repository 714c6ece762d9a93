//! Candidate folder scanning

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{SwapError, SwapResult};
use crate::media::{has_extension, ClipKind, MediaClip};

/// Scan `folder` for media files matching `extensions`.
///
/// Only the folder itself is scanned (no recursion), so output
/// subfolders created next to the candidates are never picked up.
/// Results are sorted lexicographically by file name; that order is
/// the pool order for the whole run.
pub fn scan_folder(
    folder: &Path,
    extensions: &[String],
    kind: ClipKind,
) -> SwapResult<Vec<MediaClip>> {
    if !folder.is_dir() {
        return Err(SwapError::configuration(format!(
            "directory not found: {}",
            folder.display()
        )));
    }

    let mut clips: Vec<MediaClip> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), extensions))
        .map(|entry| MediaClip {
            path: entry.into_path(),
            kind,
        })
        .collect();

    // sort_by_file_name already orders entries, but make the contract
    // explicit in case the walker's ordering guarantees change
    clips.sort_by(|a, b| a.path.cmp(&b.path));

    debug!("found {} media files in {}", clips.len(), folder.display());
    Ok(clips)
}
