//! Priority schema lookup for records
//!
//! Every record uses the default schema. A schema file with the same file
//! name as the record, next to the default one, overrides it field by field.

use canon_resolver::{LayeredSchema, PrioritySchema, ResolveError};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PrioritiesSettings;

/// Errors loading priority schemas
#[derive(Debug, thiserror::Error)]
pub enum PrioritiesError {
    #[error("default priority schema not found: {0}")]
    MissingDefault(PathBuf),

    #[error("cannot read priority schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid priority schema {path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: ResolveError,
    },
}

/// Directory of priority schemas
#[derive(Debug, Clone)]
pub struct PriorityStore {
    dir: PathBuf,
    default_file: String,
}

impl PriorityStore {
    pub fn new(dir: impl Into<PathBuf>, default_file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            default_file: default_file.into(),
        }
    }

    pub fn from_settings(settings: &PrioritiesSettings) -> Self {
        Self::new(&settings.dir, &settings.default_file)
    }

    pub fn default_path(&self) -> PathBuf {
        self.dir.join(&self.default_file)
    }

    /// Override schema path for a record, whether or not it exists
    pub fn override_path(&self, record: &Path) -> Option<PathBuf> {
        record.file_name().map(|name| self.dir.join(name))
    }

    /// Layered schema for one record.
    pub fn schema_for(&self, record: &Path) -> Result<LayeredSchema, PrioritiesError> {
        let default_path = self.default_path();
        if !default_path.is_file() {
            return Err(PrioritiesError::MissingDefault(default_path));
        }
        let mut schema = LayeredSchema::new(load_schema(&default_path)?);

        if let Some(path) = self.override_path(record).filter(|p| p.is_file()) {
            tracing::debug!(record = %record.display(), schema = %path.display(), "using priority override");
            schema = schema.with_override(load_schema(&path)?);
        }

        Ok(schema)
    }
}

fn load_schema(path: &Path) -> Result<PrioritySchema, PrioritiesError> {
    let text = fs::read_to_string(path).map_err(|source| PrioritiesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    PrioritySchema::from_yaml_str(&text).map_err(|source| PrioritiesError::Schema {
        path: path.to_path_buf(),
        source,
    })
}
