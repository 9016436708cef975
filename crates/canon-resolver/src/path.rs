//! Dotted key paths into YAML trees.
//!
//! `wikidata.license_label.0.value` walks the mapping key `wikidata`, then
//! `license_label`, then element `0` of that sequence, then `value`.

use serde_yaml::Value;
use std::fmt;

/// A candidate path as written in a priority schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    raw: String,
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted path. Empty segments are ignored.
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The path exactly as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the origin this path reads from: the text before the first dot.
    pub fn source_tag(&self) -> &str {
        self.raw.split('.').next().unwrap_or(&self.raw)
    }

    /// Value at this path, or `None` when any segment is missing.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        lookup(root, &self.segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Walk `segments` from `root`.
///
/// Mappings are indexed by key, sequences by decimal index. Stepping into a
/// scalar or a null yields `None`; a null reached by the last segment is a
/// present value.
pub fn lookup<'a, S: AsRef<str>>(root: &'a Value, segments: &[S]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| child(node, segment.as_ref()))
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Mapping(map) => map.get(segment).or_else(|| {
            map.iter()
                .find(|(key, _)| scalar_key_text(key).as_deref() == Some(segment))
                .map(|(_, value)| value)
        }),
        Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Tagged(tagged) => child(&tagged.value, segment),
        _ => None,
    }
}

/// Text form of a non-string scalar mapping key (`2020`, `true`, `null`).
///
/// String keys return `None`; they are matched directly.
pub(crate) fn scalar_key_text(key: &Value) -> Option<String> {
    match key {
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        _ => None,
    }
}
