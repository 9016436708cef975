//! CSV export of canonical blocks
//!
//! One row per record, read only from the record's canonical block. Records
//! without a value in the first column are left out. Rows are sorted by that
//! first column.

use canon_resolver::{CanonicalField, KeyPath};
use serde_yaml::Value;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{ExportColumn, Settings};
use crate::discover::{discover_records, DiscoverError, RecordMatcher};
use crate::record::load_record;

/// Errors for CSV export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("discovery error: {0}")]
    Discover(#[from] DiscoverError),

    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output error: {0}")]
    Io(#[from] io::Error),
}

/// Values of one record, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub cells: Vec<String>,
    /// One list per repeated column
    pub lists: Vec<Vec<String>>,
}

/// Rows ready to write, plus the width of each repeated column
#[derive(Debug, Clone)]
pub struct ExportTable {
    columns: Vec<ExportColumn>,
    repeated: Vec<ExportColumn>,
    widths: Vec<usize>,
    pub rows: Vec<ExportRow>,
    /// Records dropped because they failed to load or had no name
    pub skipped: usize,
}

impl ExportTable {
    pub fn new(columns: Vec<ExportColumn>, repeated: Vec<ExportColumn>) -> Self {
        let widths = vec![0; repeated.len()];
        Self {
            columns,
            repeated,
            widths,
            rows: Vec::new(),
            skipped: 0,
        }
    }

    /// Add the row for one canonical block. Returns `false` when the block
    /// has nothing in the first column.
    pub fn push_canonical(&mut self, canonical: &Value) -> bool {
        let cells: Vec<String> = self
            .columns
            .iter()
            .map(|column| field_text(canonical, &column.path))
            .collect();
        if cells.first().map_or(true, |name| name.is_empty()) {
            self.skipped += 1;
            return false;
        }

        let lists: Vec<Vec<String>> = self
            .repeated
            .iter()
            .map(|column| list_texts(canonical, &column.path))
            .collect();
        for (width, list) in self.widths.iter_mut().zip(&lists) {
            *width = (*width).max(list.len());
        }

        self.rows.push(ExportRow { cells, lists });
        true
    }

    pub fn headers(&self) -> Vec<&str> {
        let mut headers: Vec<&str> = self.columns.iter().map(|c| c.header.as_str()).collect();
        for (column, width) in self.repeated.iter().zip(&self.widths) {
            headers.extend(std::iter::repeat(column.header.as_str()).take(*width));
        }
        headers
    }

    /// Write header and rows, sorted by the first column.
    pub fn write_csv<W: io::Write>(&mut self, writer: W) -> Result<(), ExportError> {
        self.rows.sort_by(|a, b| a.cells[0].cmp(&b.cells[0]));

        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.headers())?;
        for row in &self.rows {
            let mut record: Vec<&str> = row.cells.iter().map(String::as_str).collect();
            for (list, width) in row.lists.iter().zip(&self.widths) {
                record.extend(list.iter().map(String::as_str));
                record.extend(std::iter::repeat("").take(width - list.len()));
            }
            out.write_record(&record)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Read the canonical block of every record in `dir`.
pub fn collect_table(dir: &Path, settings: &Settings) -> Result<ExportTable, ExportError> {
    let matcher = RecordMatcher::new(&settings.discovery.patterns)?;
    let files = discover_records(dir, &matcher, settings.discovery.recursive)?;
    let canonical_key = Value::from(settings.record.canonical_key.as_str());
    let empty = Value::Null;

    let mut table = ExportTable::new(
        settings.export.columns.clone(),
        settings.export.repeated.clone(),
    );
    for path in &files {
        let record = match load_record(path) {
            Ok(record) => record,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping record in export");
                table.skipped += 1;
                continue;
            }
        };
        let canonical = record.data.get(&canonical_key).unwrap_or(&empty);
        if !table.push_canonical(canonical) {
            debug!(path = %path.display(), "record has no name, not exported");
        }
    }
    Ok(table)
}

/// Export the canonical blocks of `dir` to a CSV file. Returns the table
/// that was written.
pub fn export_csv(dir: &Path, settings: &Settings, out: &Path) -> Result<ExportTable, ExportError> {
    let mut table = collect_table(dir, settings)?;
    let file = File::create(out).map_err(|source| ExportError::Create {
        path: out.to_path_buf(),
        source,
    })?;
    table.write_csv(file)?;
    Ok(table)
}

/// Value of a `{source, value}` field at `path`, as cell text.
fn field_text(canonical: &Value, path: &str) -> String {
    KeyPath::parse(path)
        .lookup(canonical)
        .and_then(as_field)
        .map(|field| cell_text(&field.value))
        .unwrap_or_default()
}

/// Values of a list of `{source, value}` fields at `path`.
fn list_texts(canonical: &Value, path: &str) -> Vec<String> {
    match KeyPath::parse(path).lookup(canonical) {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(as_field)
            .map(|field| cell_text(&field.value))
            .collect(),
        Some(node) => as_field(node)
            .map(|field| vec![cell_text(&field.value)])
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

fn as_field(node: &Value) -> Option<CanonicalField> {
    serde_yaml::from_value(node.clone()).ok()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
