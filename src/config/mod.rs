//! Run settings
//!
//! Three layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Settings file (`canonicalize.toml` or `--config`)
//! 3. CLI flags

mod defaults;
mod merge;
mod settings;

pub use defaults::{
    DEFAULT_CANONICAL_KEY, DEFAULT_PATTERNS, DEFAULT_PRIORITIES_DIR, DEFAULT_SCHEMA_FILE,
    DEFAULT_SETTINGS_FILE, DEFAULT_SOURCE_KEY,
};
pub use merge::{deep_merge, merge_layers};
pub use settings::{
    BatchSettings, ConfigError, ConfigOrigin, ConfigSource, DiscoverySettings, ExportColumn,
    ExportSettings, PrioritiesSettings, RecordSettings, Settings,
};
