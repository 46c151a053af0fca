/* src/server/engine/rust/src/merge.rs */

//! Deep merge of attribute trees. Later hooks layer attributes onto earlier
//! ones; arrays absorb new content without being replaced wholesale.

use serde_json::{Map, Value};

fn is_mergeable(value: &Value) -> bool {
  matches!(value, Value::Object(_) | Value::Array(_))
}

/// Merge `incoming` into `base`, returning the combined tree.
///
/// Objects merge key-wise. Arrays merge by index: a missing index takes the
/// incoming value, a mergeable incoming value merges into the base value at
/// that index, and an incoming scalar is appended only if the base array
/// does not already contain it. Anything else is replaced by `incoming`.
pub fn deep_merge(base: &Value, incoming: &Value) -> Value {
  match (base, incoming) {
    (Value::Array(target), Value::Array(source)) => Value::Array(merge_arrays(target, source)),
    (Value::Object(target), Value::Object(source)) => Value::Object(merge_objects(target, source)),
    _ => incoming.clone(),
  }
}

fn merge_objects(target: &Map<String, Value>, source: &Map<String, Value>) -> Map<String, Value> {
  let mut destination = target.clone();
  for (key, value) in source {
    let merged = match target.get(key) {
      Some(existing) if is_mergeable(value) => deep_merge(existing, value),
      _ => value.clone(),
    };
    destination.insert(key.clone(), merged);
  }
  destination
}

fn merge_arrays(target: &[Value], source: &[Value]) -> Vec<Value> {
  let mut destination = target.to_vec();
  for (index, item) in source.iter().enumerate() {
    if index >= destination.len() {
      // index alignment: only reached while the destination is exactly `index` long
      destination.push(item.clone());
    } else if is_mergeable(item) {
      destination[index] = match target.get(index) {
        Some(existing) => deep_merge(existing, item),
        None => item.clone(),
      };
    } else if !target.contains(item) {
      destination.push(item.clone());
    }
  }
  destination
}
