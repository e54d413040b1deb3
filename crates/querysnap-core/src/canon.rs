//! Canonical serialization helpers.
//!
//! Everything the renderer writes goes through these functions so that two
//! runs over the same logical data produce byte-identical text. Object keys
//! are always emitted in sorted order and document arrays can be reordered by
//! a deterministic rule before rendering.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// Serialize a value as compact single-line JSON with sorted object keys.
pub fn single_line(value: &Value) -> String {
    serde_json::to_string(&sort_keys(value)).unwrap_or_else(|_| "null".to_string())
}

/// Serialize a value as pretty-printed JSON with sorted object keys.
pub fn sorted_multiline(value: &Value) -> String {
    serde_json::to_string_pretty(&sort_keys(value)).unwrap_or_else(|_| "null".to_string())
}

/// Render a result set as a pretty-printed JSON array with sorted keys.
///
/// With `sort` set, documents are reordered by [`compare_values`], so any
/// permutation of the same documents renders identically. Without it the
/// engine-returned order is preserved.
pub fn normalize_result_array(results: &[Value], sort: bool) -> String {
    let mut docs: Vec<Value> = results.iter().map(sort_keys).collect();
    if sort {
        docs.sort_by(compare_values);
    }
    serde_json::to_string_pretty(&Value::Array(docs)).unwrap_or_else(|_| "[]".to_string())
}

/// Map an optional projected value to its canonical form.
///
/// Absent keys and explicit nulls both collapse to the canonical null marker;
/// every other value is kept as-is.
pub fn canonical_value(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Null,
        Some(other) => other.clone(),
    }
}

/// Total order over JSON values used for deterministic sorting.
///
/// Types rank null < bool < number < string < array < object. Numbers compare
/// by numeric value, strings lexicographically, arrays element-wise, objects
/// by their sorted key/value pairs.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (xi, yi) in x.iter().zip(y.iter()) {
                let ord = compare_values(xi, yi);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            let xs = sorted_pairs(x);
            let ys = sorted_pairs(y);
            for ((xk, xv), (yk, yv)) in xs.iter().zip(ys.iter()) {
                let ord = xk.cmp(yk).then_with(|| compare_values(xv, yv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Rebuild a value with every object's keys in sorted order.
///
/// `serde_json`'s default map is already sorted; this stays correct even if a
/// dependent crate turns on `preserve_order`.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        Value::Object(map) => {
            let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, val) in pairs {
                sorted.insert(key.clone(), sort_keys(val));
            }
            Value::Object(sorted)
        }
        other => other.clone(),
    }
}

fn sorted_pairs(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
