//! Merged record files
//!
//! A record is a YAML mapping. When written back, every mapping is
//! reordered: the source marker key first, then `name`, then the canonical
//! block, then all remaining keys in ascending order.

use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Key that always follows the source marker.
pub const NAME_KEY: &str = "name";

/// Errors reading or writing records
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{0} does not contain a YAML mapping")]
    NotAMapping(PathBuf),

    #[error("cannot serialize record: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// A record as read from disk
#[derive(Debug, Clone)]
pub struct LoadedRecord {
    /// File contents before any change
    pub original: String,
    pub data: Mapping,
}

/// Read and parse one record.
pub fn load_record(path: &Path) -> Result<LoadedRecord, RecordError> {
    let original = fs::read_to_string(path).map_err(|source| RecordError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_yaml::from_str(&original).map_err(|source| RecordError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Mapping(data) => Ok(LoadedRecord { original, data }),
        _ => Err(RecordError::NotAMapping(path.to_path_buf())),
    }
}

/// Top-level key ranking used when writing records.
#[derive(Debug, Clone)]
pub struct KeyOrder {
    source_key: String,
    canonical_key: String,
}

impl KeyOrder {
    pub fn new(source_key: impl Into<String>, canonical_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            canonical_key: canonical_key.into(),
        }
    }

    fn rank(&self, key: &str) -> u8 {
        if key == self.source_key {
            0
        } else if key == NAME_KEY {
            1
        } else if key == self.canonical_key {
            2
        } else {
            3
        }
    }

    /// Reorder every mapping in `value`, recursively.
    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::Mapping(map) => Value::Mapping(self.apply_mapping(map)),
            Value::Sequence(items) => {
                Value::Sequence(items.into_iter().map(|item| self.apply(item)).collect())
            }
            Value::Tagged(mut tagged) => {
                tagged.value = self.apply(std::mem::take(&mut tagged.value));
                Value::Tagged(tagged)
            }
            scalar => scalar,
        }
    }

    pub fn apply_mapping(&self, map: Mapping) -> Mapping {
        let mut entries: Vec<(Value, Value)> = map
            .into_iter()
            .map(|(key, value)| (key, self.apply(value)))
            .collect();

        entries.sort_by(|(a, _), (b, _)| {
            let (a, b) = (key_text(a), key_text(b));
            self.rank(&a).cmp(&self.rank(&b)).then_with(|| a.cmp(&b))
        });

        entries.into_iter().collect()
    }
}

/// Text a mapping key is compared by.
fn key_text(key: &Value) -> Cow<'_, str> {
    match key {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(
            serde_yaml::to_string(other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        ),
    }
}

/// Serialize a record in its final key order.
pub fn render_record(data: impl Into<Value>, order: &KeyOrder) -> Result<String, RecordError> {
    let ordered = order.apply(data.into());
    Ok(serde_yaml::to_string(&ordered)?)
}

pub fn write_record(path: &Path, text: &str) -> Result<(), RecordError> {
    fs::write(path, text).map_err(|source| RecordError::Write {
        path: path.to_path_buf(),
        source,
    })
}
