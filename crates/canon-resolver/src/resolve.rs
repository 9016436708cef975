//! Recursive resolution of a layered priority schema against a record.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::{display_path, ResolveError};
use crate::path::{scalar_key_text, KeyPath};
use crate::schema::{split_accumulating, LayeredSchema};

/// A resolved value and the source it was read from.
///
/// Deserializes from the `{source, value}` mapping written into records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CanonicalField {
    pub source: String,
    pub value: Value,
}

impl CanonicalField {
    pub fn new(source: impl Into<String>, value: Value) -> Self {
        Self {
            source: source.into(),
            value,
        }
    }

    /// Mapping form written into records: `{source, value}`.
    pub fn into_value(self) -> Value {
        let mut map = Mapping::new();
        map.insert(Value::from("source"), Value::String(self.source));
        map.insert(Value::from("value"), self.value);
        Value::Mapping(map)
    }
}

/// Build the canonical tree for `source`.
///
/// The result mirrors the schema: every candidate list becomes a
/// [`CanonicalField`] (or a list of them for accumulating keys), and fields
/// that no candidate resolves are left out.
pub fn resolve(schema: &LayeredSchema, source: &Value) -> Result<Mapping, ResolveError> {
    let mut path = Vec::new();
    resolve_mapping(schema, source, &mut path)
}

fn resolve_mapping(
    schema: &LayeredSchema,
    source: &Value,
    path: &mut Vec<String>,
) -> Result<Mapping, ResolveError> {
    let node = schema.node_at(path.as_slice()).ok_or_else(|| ResolveError::InvalidNode {
        path: display_path(path),
    })?;
    let children = node.as_mapping().ok_or_else(|| ResolveError::InvalidNode {
        path: display_path(path),
    })?;

    let mut output = Mapping::new();
    for key in children.keys() {
        let key = schema_key(key).ok_or_else(|| ResolveError::InvalidKey {
            path: display_path(path),
        })?;

        path.push(key.clone());
        let result = resolve_key(schema, source, path, &key, &mut output);
        path.pop();
        result?;
    }
    Ok(output)
}

/// Schema keys are strings; scalar keys such as `2` are read as their text.
fn schema_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        other => scalar_key_text(other),
    }
}

fn resolve_key(
    schema: &LayeredSchema,
    source: &Value,
    path: &mut Vec<String>,
    key: &str,
    output: &mut Mapping,
) -> Result<(), ResolveError> {
    let node = schema.node_at(path.as_slice()).ok_or_else(|| ResolveError::InvalidNode {
        path: display_path(path),
    })?;

    match node {
        Value::Sequence(entries) => {
            let (dest, accumulating) = split_accumulating(key);

            if accumulating {
                let records = accumulate(entries, source, path)?;
                if !records.is_empty() {
                    append_records(output, dest, records);
                }
            } else if let Some(field) = first_match(entries, source, path)? {
                output.insert(Value::from(dest), field.into_value());
            }
        }
        Value::Mapping(_) => {
            let nested = resolve_mapping(schema, source, path)?;
            if !nested.is_empty() {
                output.insert(Value::from(key), Value::Mapping(nested));
            }
        }
        _ => {
            return Err(ResolveError::InvalidNode {
                path: display_path(path),
            });
        }
    }
    Ok(())
}

fn parse_candidate(entry: &Value, index: usize, path: &[String]) -> Result<KeyPath, ResolveError> {
    entry
        .as_str()
        .map(KeyPath::parse)
        .ok_or_else(|| ResolveError::InvalidCandidate {
            path: display_path(path),
            index,
        })
}

/// First candidate with a present value.
///
/// Candidates are parsed as they are reached, so entries after the match are
/// neither looked up nor validated.
fn first_match(
    entries: &[Value],
    source: &Value,
    path: &[String],
) -> Result<Option<CanonicalField>, ResolveError> {
    for (index, entry) in entries.iter().enumerate() {
        let candidate = parse_candidate(entry, index, path)?;
        if let Some(value) = candidate.lookup(source) {
            return Ok(Some(CanonicalField::new(candidate.source_tag(), value.clone())));
        }
    }
    Ok(None)
}

/// Every present value from every candidate, sequences expanded per element.
fn accumulate(
    entries: &[Value],
    source: &Value,
    path: &[String],
) -> Result<Vec<CanonicalField>, ResolveError> {
    let mut records = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let candidate = parse_candidate(entry, index, path)?;
        let Some(value) = candidate.lookup(source) else {
            continue;
        };
        let tag = candidate.source_tag();
        match value {
            Value::Sequence(items) => {
                records.extend(items.iter().map(|item| CanonicalField::new(tag, item.clone())));
            }
            value => records.push(CanonicalField::new(tag, value.clone())),
        }
    }
    Ok(records)
}

fn append_records(output: &mut Mapping, dest: &str, records: Vec<CanonicalField>) {
    let records = records.into_iter().map(CanonicalField::into_value);
    match output.get_mut(dest) {
        Some(Value::Sequence(existing)) => existing.extend(records),
        _ => {
            output.insert(Value::from(dest), Value::Sequence(records.collect()));
        }
    }
}
