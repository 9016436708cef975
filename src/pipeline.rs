//! Batch orchestration
//!
//! Each record goes through the same independent unit of work:
//! - Load and parse the record
//! - Load its layered priority schema
//! - Drop the previous canonical block and resolve a fresh one
//! - Write the record back in canonical key order
//!
//! A failing record never affects the others. Depending on
//! `batch.fail_fast` the batch either skips it or stops.

use canon_resolver::{resolve, ResolveError};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::discover::{discover_records, DiscoverError, RecordMatcher};
use crate::priorities::{PrioritiesError, PriorityStore};
use crate::record::{load_record, render_record, write_record, KeyOrder, RecordError};
use crate::summary::{BatchSummary, FileOutcome};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No output directory given.")]
    MissingDirectory,

    #[error("Output directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("{0} is not a directory.")]
    NotADirectory(PathBuf),

    #[error("discovery error: {0}")]
    Discover(#[from] DiscoverError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Priorities(#[from] PrioritiesError),

    #[error("cannot resolve canonical fields: {0}")]
    Resolve(#[from] ResolveError),

    #[error("aborted at {path}: {source}")]
    Aborted {
        path: PathBuf,
        #[source]
        source: Box<PipelineError>,
    },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Validate the directory argument.
pub fn check_output_dir(dir: Option<&Path>) -> PipelineResult<&Path> {
    let dir = dir.ok_or(PipelineError::MissingDirectory)?;
    if !dir.exists() {
        return Err(PipelineError::DirectoryNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(PipelineError::NotADirectory(dir.to_path_buf()));
    }
    Ok(dir)
}

/// Recompute the canonical block of one record and write it back.
pub fn process_file(
    path: &Path,
    settings: &Settings,
    store: &PriorityStore,
) -> PipelineResult<FileOutcome> {
    let record = load_record(path)?;
    let schema = store.schema_for(path)?;

    let canonical_key = Value::from(settings.record.canonical_key.as_str());
    let mut data = record.data;
    data.remove(&canonical_key);

    let mut source = Value::Mapping(data);
    let canonical = resolve(&schema, &source)?;
    debug!(path = %path.display(), fields = canonical.len(), "resolved canonical block");

    if let Value::Mapping(data) = &mut source {
        data.insert(canonical_key, Value::Mapping(canonical));
    }

    let order = KeyOrder::new(&settings.record.source_key, &settings.record.canonical_key);
    let rendered = render_record(source, &order)?;
    if rendered == record.original {
        return Ok(FileOutcome::Unchanged);
    }

    write_record(path, &rendered)?;
    Ok(FileOutcome::Updated)
}

/// Process every record in `dir`.
pub fn run_batch(dir: &Path, settings: &Settings) -> PipelineResult<BatchSummary> {
    let started = Instant::now();
    let matcher = RecordMatcher::new(&settings.discovery.patterns)?;
    let files = discover_records(dir, &matcher, settings.discovery.recursive)?;
    let store = PriorityStore::from_settings(&settings.priorities);

    info!(dir = %dir.display(), records = files.len(), "processing records");

    let mut summary = BatchSummary::new(dir, files.len());
    for path in &files {
        match process_file(path, settings, &store) {
            Ok(outcome) => {
                debug!(path = %path.display(), ?outcome, "record done");
                summary.record_success(outcome);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping record");
                if settings.batch.fail_fast {
                    return Err(PipelineError::Aborted {
                        path: path.clone(),
                        source: Box::new(err),
                    });
                }
                summary.record_failure(path, &err);
            }
        }
    }

    summary.finish(started.elapsed());
    info!(
        updated = summary.files_updated,
        unchanged = summary.files_unchanged,
        failed = summary.files_failed,
        duration_ms = summary.duration_ms,
        "batch complete"
    );
    Ok(summary)
}
