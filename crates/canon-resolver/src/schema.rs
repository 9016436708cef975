//! Priority schemas and their default/override layering.
//!
//! A schema is a YAML tree. Mappings mirror the shape of the canonical
//! output; sequences are ordered candidate paths. A key ending in
//! [`ACCUMULATE_SUFFIX`] collects matches from every candidate instead of
//! stopping at the first one.
//!
//! ```yaml
//! name:
//!   - debian_appstream.Name.C
//!   - wikidata.label.0.value
//! tags[]:
//!   - civicstack.tags
//!   - debian_appstream.Categories
//! ```

use serde_yaml::Value;

use crate::error::ResolveError;
use crate::path::lookup;

/// Key suffix marking an accumulating field.
pub const ACCUMULATE_SUFFIX: &str = "[]";

/// A single priority schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct PrioritySchema {
    root: Value,
}

impl Default for PrioritySchema {
    fn default() -> Self {
        Self {
            root: Value::Mapping(Default::default()),
        }
    }
}

impl PrioritySchema {
    /// Wrap an already parsed tree. An empty document is an empty schema.
    pub fn from_value(root: Value) -> Self {
        match root {
            Value::Null => Self::default(),
            root => Self { root },
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ResolveError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let root: Value = serde_yaml::from_str(text)?;
        Ok(Self::from_value(root))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Schema node at `path`, or `None` if the schema has no such node.
    pub fn node_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        lookup(&self.root, path)
    }
}

/// Default schema with an optional per-record override.
///
/// An override node replaces the default node at the same path as a whole.
/// There is no merging between the two below that path.
#[derive(Debug, Clone, Default)]
pub struct LayeredSchema {
    default: PrioritySchema,
    overrides: Option<PrioritySchema>,
}

impl LayeredSchema {
    pub fn new(default: PrioritySchema) -> Self {
        Self {
            default,
            overrides: None,
        }
    }

    pub fn with_override(mut self, overrides: PrioritySchema) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn has_override(&self) -> bool {
        self.overrides.is_some()
    }

    /// Effective node at `path`.
    ///
    /// The root always comes from the default schema; an override node set
    /// to null falls back to the default.
    pub fn node_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        if !path.is_empty() {
            let overridden = self
                .overrides
                .as_ref()
                .and_then(|o| o.node_at(path))
                .filter(|node| !node.is_null());
            if overridden.is_some() {
                return overridden;
            }
        }
        self.default.node_at(path)
    }
}

/// Destination key for a schema key, and whether it accumulates.
pub(crate) fn split_accumulating(key: &str) -> (&str, bool) {
    match key.strip_suffix(ACCUMULATE_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (key, false),
    }
}
