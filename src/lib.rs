//! canonicalize - canonical fields for merged YAML records
//!
//! Records merged from several origin files carry one block per origin.
//! This crate picks, for every field described by a priority schema, the
//! value from the highest-priority origin that has one, and writes the
//! result back into each record under a single `canonical` block.

pub mod config;
pub mod discover;
pub mod export;
pub mod pipeline;
pub mod priorities;
pub mod record;
pub mod summary;

pub use canon_resolver::{resolve, CanonicalField, KeyPath, LayeredSchema, PrioritySchema};
pub use config::Settings;
pub use export::{export_csv, ExportError, ExportTable};
pub use pipeline::{check_output_dir, process_file, run_batch, PipelineError};
pub use priorities::PriorityStore;
pub use summary::{BatchSummary, FileOutcome};
