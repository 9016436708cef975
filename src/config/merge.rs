//! Settings layer merge
//!
//! Tables merge key by key. Anything else in a higher layer (pattern lists
//! included) replaces the lower value outright. A `null` in a higher layer
//! leaves the lower value in place, so a layer can name a key without
//! setting it.

use serde_json::Value;

/// Apply `overlay` on top of `base`.
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    merge_into(&mut base, overlay);
    base
}

fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(table), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge_into(table.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Fold layers lowest precedence first.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}
