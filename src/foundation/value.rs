//! Helpers over `serde_json::Value` shared by the template, expression and schema layers.
//!
//! "undefined" is modelled as `None`; JSON `null` is `Some(Value::Null)`.

use crate::foundation::error::{FormError, FormResult};
use serde_json::{Map, Number, Value};

/// Iterate the non-empty segments of a dotted path.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

/// Join a parent path and a key with a `.`, treating an empty parent as the root.
pub fn join_path(parent: Option<&str>, key: &str) -> String {
    match parent {
        Some(p) if !p.is_empty() => format!("{p}.{key}"),
        _ => key.to_owned(),
    }
}

/// Read `path` below `root` by successive property access.
///
/// Intermediate steps are not null-guarded: reading a segment off a missing or `null` value is a
/// [`FormError::PathTraversal`]. A missing final segment is `Ok(None)`.
pub fn get_path(root: &Value, path: &str) -> FormResult<Option<Value>> {
    let mut current: Option<Value> = Some(root.clone());
    let mut walked = String::new();

    for seg in path_segments(path) {
        current = match current {
            None => {
                return Err(FormError::path_traversal(format!(
                    "cannot read '{seg}' of undefined at '{walked}'"
                )));
            }
            Some(Value::Null) => {
                return Err(FormError::path_traversal(format!(
                    "cannot read '{seg}' of null at '{walked}'"
                )));
            }
            Some(v) => property(&v, seg),
        };
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(seg);
    }

    Ok(current)
}

fn property(v: &Value, seg: &str) -> Option<Value> {
    match v {
        Value::Object(m) => m.get(seg).cloned(),
        Value::Array(items) => {
            if seg == "length" {
                return Some(Value::from(items.len()));
            }
            seg.parse::<usize>().ok().and_then(|i| items.get(i).cloned())
        }
        Value::String(s) if seg == "length" => Some(Value::from(s.chars().count())),
        _ => None,
    }
}

/// Write `value` at `path` below `root`, creating (or replacing non-object) intermediates.
pub fn set_path(root: &mut Value, path: &str, value: Value) {
    let segs: Vec<&str> = path_segments(path).collect();
    let Some((last, parents)) = segs.split_last() else {
        *root = value;
        return;
    };

    let mut cur = root;
    for seg in parents {
        let obj = ensure_object(cur);
        cur = obj
            .entry((*seg).to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(cur).insert((*last).to_owned(), value);
}

fn ensure_object(v: &mut Value) -> &mut Map<String, Value> {
    if !v.is_object() {
        *v = Value::Object(Map::new());
    }
    match v {
        Value::Object(m) => m,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// Stringify a resolved value the way template substitution expects.
///
/// `None` and `null` become the empty string.
pub fn display_value(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => format_number(n),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| display_value(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_owned(),
    }
}

/// Integral floats print without a fractional part (`3.0` -> `3`).
pub fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) if f.is_nan() => "NaN".to_owned(),
        Some(f) if f.is_infinite() => {
            if f > 0.0 {
                "Infinity".to_owned()
            } else {
                "-Infinity".to_owned()
            }
        }
        _ => n.to_string(),
    }
}

/// JS-style truthiness: `false`, `0`, `""`, `null` and undefined are falsy.
pub fn is_truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Build a JSON number from an `f64`, keeping integral values integral.
pub fn number_value(f: f64) -> Value {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/value.rs"]
mod tests;
