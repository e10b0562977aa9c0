//! Source file discovery.
//!
//! Walks a source tree and collects every file whose name ends in `.c`
//! (case-insensitive). Entries are visited sorted by file name within each
//! directory so repeated walks over the same tree yield the same order.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::SOURCE_EXTENSION;
use crate::error::{Error, Result};

/// Find all compilable source files under `root`.
///
/// Any traversal error (missing root, unreadable directory) aborts discovery.
pub fn find_sources(root: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| Error::Discovery {
            root: root.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        if is_source_file(entry.path()) {
            sources.push(entry.into_path());
        }
    }

    tracing::debug!(root = %root.display(), count = sources.len(), "discovered sources");
    Ok(sources)
}

/// Whether the path names a source file, by case-insensitive suffix.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}
