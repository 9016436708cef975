//! Batch summary
//!
//! One summary per run: how many records were found, rewritten, left
//! untouched, or skipped because they failed.

use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Schema version of the JSON summary
pub const SUMMARY_SCHEMA_VERSION: u32 = 1;

/// What happened to a record that was processed successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// File contents changed and were written
    Updated,
    /// Rendered output matched the file already on disk
    Unchanged,
}

/// A record that could not be processed
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Batch summary
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub schema_version: u32,

    /// Directory the batch ran over
    pub directory: String,

    pub files_found: usize,
    pub files_updated: usize,
    pub files_unchanged: usize,
    pub files_failed: usize,

    /// Per-file failures in processing order
    pub failures: Vec<FileFailure>,

    pub duration_ms: u64,
}

impl BatchSummary {
    pub fn new(directory: &Path, files_found: usize) -> Self {
        Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            directory: directory.to_string_lossy().to_string(),
            files_found,
            files_updated: 0,
            files_unchanged: 0,
            files_failed: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn record_success(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Updated => self.files_updated += 1,
            FileOutcome::Unchanged => self.files_unchanged += 1,
        }
    }

    pub fn record_failure(&mut self, path: &Path, error: &dyn std::error::Error) {
        self.files_failed += 1;
        self.failures.push(FileFailure {
            path: path.to_string_lossy().to_string(),
            error: error.to_string(),
        });
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    }

    /// Records whose canonical block is current on disk
    pub fn files_processed(&self) -> usize {
        self.files_updated + self.files_unchanged
    }

    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    /// Human-readable report
    pub fn to_human(&self) -> String {
        let mut out = format!("Updated {} files", self.files_processed());
        if self.has_failures() {
            out.push_str(&format!("\nSkipped {} files with errors:", self.files_failed));
            for failure in &self.failures {
                out.push_str(&format!("\n  {}: {}", failure.path, failure.error));
            }
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
