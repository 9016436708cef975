//! Built-in defaults (lowest settings layer)

use serde_json::{json, Value};

/// Directory holding priority schemas, relative to the working directory.
pub const DEFAULT_PRIORITIES_DIR: &str = "priorities";

/// Schema applied to every record.
pub const DEFAULT_SCHEMA_FILE: &str = "_default.yaml";

/// Top-level record key receiving the resolved block.
pub const DEFAULT_CANONICAL_KEY: &str = "canonical";

/// Top-level record key naming where the record was merged from.
pub const DEFAULT_SOURCE_KEY: &str = "_source";

/// Record file name patterns.
pub const DEFAULT_PATTERNS: &[&str] = &["*.yaml", "*.yml"];

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "canonicalize.toml";

/// Built-in layer as a mergeable value.
pub fn builtin_layer() -> Value {
    json!({
        "priorities": {
            "dir": DEFAULT_PRIORITIES_DIR,
            "default_file": DEFAULT_SCHEMA_FILE
        },
        "record": {
            "canonical_key": DEFAULT_CANONICAL_KEY,
            "source_key": DEFAULT_SOURCE_KEY
        },
        "discovery": {
            "patterns": DEFAULT_PATTERNS,
            "recursive": false
        },
        "batch": {
            "fail_fast": false
        },
        "export": {
            "columns": [
                {"header": "Name", "path": "name"},
                {"header": "Description", "path": "longDescription.en"},
                {"header": "License", "path": "license"},
                {"header": "Source Code URL", "path": "sourceCode"},
                {"header": "Bug Tracker URL", "path": "bugTracker"},
                {"header": "Screenshot URL", "path": "screenshot"},
                {"header": "StackExchange Tag", "path": "stackexchangeTag"}
            ],
            "repeated": [
                {"header": "Tag", "path": "tags.en"}
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layer_shape() {
        let layer = builtin_layer();
        assert_eq!(layer["priorities"]["dir"], "priorities");
        assert_eq!(layer["priorities"]["default_file"], "_default.yaml");
        assert_eq!(layer["record"]["canonical_key"], "canonical");
        assert_eq!(layer["record"]["source_key"], "_source");
        assert_eq!(layer["discovery"]["patterns"][1], "*.yml");
        assert_eq!(layer["batch"]["fail_fast"], false);
        assert_eq!(layer["export"]["columns"][0]["header"], "Name");
        assert_eq!(layer["export"]["repeated"][0]["path"], "tags.en");
    }
}
