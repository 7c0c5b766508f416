use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

/// Extensions accepted as corpus text, matched case-insensitively against
/// the final path segment.
const TEXT_EXTENSIONS: [&str; 2] = ["txt", "text"];

pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)))
        .unwrap_or(false)
}

/// All text files under `root` (or `root` itself if it is a matching file),
/// depth-first, following symlinks. Unreadable entries are logged and
/// skipped rather than aborting the walk.
pub fn find_text_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() && is_text_file(entry.path()) => {
                Some(entry.into_path())
            }
            Ok(_) => None,
            Err(err) => {
                warn!("skipping unreadable entry: {}", err);
                None
            }
        })
        .collect()
}
