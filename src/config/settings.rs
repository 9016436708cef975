//! Effective settings with provenance
//!
//! Built from up to three layers: built-in defaults, an optional TOML
//! settings file, and CLI flags.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::builtin_layer;
use super::merge::merge_layers;

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Where a settings layer came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Where priority schemas live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PrioritiesSettings {
    pub dir: PathBuf,
    pub default_file: String,
}

/// Record layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RecordSettings {
    pub canonical_key: String,
    pub source_key: String,
}

/// Which files are records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiscoverySettings {
    pub patterns: Vec<String>,
    pub recursive: bool,
}

/// Batch failure policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BatchSettings {
    /// Stop at the first record that fails instead of skipping it
    pub fail_fast: bool,
}

/// One CSV column read from the canonical block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExportColumn {
    pub header: String,
    /// Dotted path inside the canonical block
    pub path: String,
}

/// CSV export layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExportSettings {
    /// Single-value columns; the first one names the row
    pub columns: Vec<ExportColumn>,
    /// List columns, widened to the longest list across records
    pub repeated: Vec<ExportColumn>,
}

/// Merged settings for one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub priorities: PrioritiesSettings,
    pub record: RecordSettings,
    pub discovery: DiscoverySettings,
    pub batch: BatchSettings,
    pub export: ExportSettings,

    /// Contributing layers in precedence order
    #[serde(skip)]
    pub sources: Vec<ConfigSource>,
}

impl Settings {
    /// Build settings from the built-in layer, a settings file and CLI overrides.
    pub fn build(
        settings_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![builtin_layer()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
        }];

        if let Some(path) = settings_path {
            layers.push(Self::load_toml_file(path)?);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
            });
        }

        Self::from_layers(layers, sources)
    }

    fn from_layers(layers: Vec<Value>, sources: Vec<ConfigSource>) -> Result<Self, ConfigError> {
        let merged = merge_layers(layers);
        let mut settings: Settings =
            serde_json::from_value(merged).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        settings.sources = sources;
        settings.validate()?;
        Ok(settings)
    }

    /// Read a TOML settings file straight into a mergeable layer.
    fn load_toml_file(path: &Path) -> Result<Value, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.priorities.default_file.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "priorities.default_file must not be empty".to_string(),
            ));
        }
        if self.record.canonical_key.is_empty() {
            return Err(ConfigError::Invalid(
                "record.canonical_key must not be empty".to_string(),
            ));
        }
        if self.record.canonical_key == self.record.source_key {
            return Err(ConfigError::Invalid(format!(
                "record.canonical_key and record.source_key are both `{}`",
                self.record.canonical_key
            )));
        }
        if self.export.columns.is_empty() {
            return Err(ConfigError::Invalid(
                "export.columns must list at least one column".to_string(),
            ));
        }
        if self.discovery.patterns.is_empty() {
            return Err(ConfigError::Invalid(
                "discovery.patterns must list at least one pattern".to_string(),
            ));
        }
        Ok(())
    }
}
