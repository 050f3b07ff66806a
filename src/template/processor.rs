//! `{{ expr }}` detection and substitution over JSON values.

use crate::foundation::error::FormResult;
use crate::foundation::value::display_value;
use crate::template::resolver::ResolveVariable;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^}]+)\s*\}\}").expect("template marker pattern is valid")
});

/// Every `{{ ... }}` inner expression in `s`, trimmed, in order of appearance.
pub fn detect(s: &str) -> Vec<String> {
    MARKER
        .captures_iter(s)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .collect()
}

/// Whether `s` contains at least one marker.
pub fn has_markers(s: &str) -> bool {
    MARKER.is_match(s)
}

/// Whether [`process`] would change anything reachable from `value`.
pub fn needs_processing(value: &Value) -> bool {
    match value {
        Value::String(s) => has_markers(s),
        Value::Array(items) => items.iter().any(needs_processing),
        Value::Object(map) => map.values().any(needs_processing),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Substitute every marker in `s`. A string without markers is returned borrowed.
pub fn process_str<'s, R>(s: &'s str, resolver: &R) -> FormResult<Cow<'s, str>>
where
    R: ResolveVariable + ?Sized,
{
    if !has_markers(s) {
        return Ok(Cow::Borrowed(s));
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0usize;
    for caps in MARKER.captures_iter(s) {
        let (Some(whole), Some(expr)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&s[last..whole.start()]);
        let resolved = resolver.resolve(expr.as_str().trim())?;
        out.push_str(&display_value(resolved.as_ref()));
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Ok(Cow::Owned(out))
}

/// Recursively substitute markers.
///
/// Strings without markers and non-string scalars come back borrowed (identity); arrays and
/// objects are always rebuilt.
pub fn process<'v, R>(value: &'v Value, resolver: &R) -> FormResult<Cow<'v, Value>>
where
    R: ResolveVariable + ?Sized,
{
    match value {
        Value::String(s) => Ok(match process_str(s, resolver)? {
            Cow::Borrowed(_) => Cow::Borrowed(value),
            Cow::Owned(out) => Cow::Owned(Value::String(out)),
        }),
        Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| process(item, resolver).map(Cow::into_owned))
                .collect::<FormResult<Vec<_>>>()?;
            Ok(Cow::Owned(Value::Array(items)))
        }
        Value::Object(map) => Ok(Cow::Owned(Value::Object(process_map(map, resolver)?))),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(Cow::Borrowed(value)),
    }
}

/// Key-wise [`process`] over a property bag.
pub fn process_map<R>(map: &Map<String, Value>, resolver: &R) -> FormResult<Map<String, Value>>
where
    R: ResolveVariable + ?Sized,
{
    map.iter()
        .map(|(k, v)| Ok((k.clone(), process(v, resolver)?.into_owned())))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/template/processor.rs"]
mod tests;
