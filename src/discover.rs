//! Record discovery
//!
//! Records are files whose name matches one of the configured glob patterns
//! (`*.yaml` and `*.yml` by default). Matching is case-sensitive and looks at
//! the file name only. Hidden files and, when walking recursively, hidden
//! directories are skipped.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Errors for record discovery
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),
}

/// File name patterns identifying records
#[derive(Debug)]
pub struct RecordMatcher {
    glob_set: GlobSet,
}

impl RecordMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, DiscoverError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if !pattern.is_empty() {
                builder.add(Glob::new(pattern)?);
            }
        }

        Ok(Self {
            glob_set: builder.build()?,
        })
    }

    /// Check whether a file name designates a record
    pub fn is_record(&self, file_name: &str) -> bool {
        !file_name.starts_with('.') && self.glob_set.is_match(file_name)
    }
}

/// List records under `dir`, sorted by path.
///
/// Only direct children are considered unless `recursive` is set.
pub fn discover_records(
    dir: &Path,
    matcher: &RecordMatcher,
    recursive: bool,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut records = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden_dir(entry));

    for entry in walker {
        let entry = entry?;
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if entry.path().is_file() && matcher.is_record(file_name) {
            records.push(entry.into_path());
        }
    }

    Ok(records)
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}
