use crate::foundation::value::{get_path, set_path};
use crate::schema::fields::{FieldDescriptor, build_initial_values, initial_values_for};
use crate::schema::node::SchemaNode;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Called with `(name, value)` after every [`FormAdapter::set_value`].
pub type WatchCallback = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Handle returned by [`FormAdapter::watch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

/// Field value store the render layers read form state from.
///
/// Names are dotted paths as produced by the field extractor.
pub trait FormAdapter {
    /// All values as one nested object.
    fn get_values(&self) -> Value;
    /// One value; `None` when absent or unreachable.
    fn get_value(&self, name: &str) -> Option<Value>;
    /// Write one value and notify watchers.
    fn set_value(&mut self, name: &str, value: Value);
    /// Subscribe to value changes.
    fn watch(&mut self, callback: WatchCallback) -> WatchId;
    /// Drop a subscription; `false` when `id` is unknown.
    fn unwatch(&mut self, id: WatchId) -> bool;
    /// Replace all values, or restore the initial ones with `None`. Clears errors.
    fn reset(&mut self, values: Option<Value>);
    /// Track a field; it receives its initial value when it has none yet.
    fn register(&mut self, name: &str);
    /// Stop tracking a field and drop its error.
    fn unregister(&mut self, name: &str) -> bool;
    /// Current errors by field name.
    fn get_errors(&self) -> &BTreeMap<String, String>;
    /// Record an error for a field.
    fn set_error(&mut self, name: &str, message: String);
    /// Clear one field's error, or all with `None`.
    fn clear_errors(&mut self, name: Option<&str>);
    /// Whether no errors are recorded.
    fn is_valid(&self) -> bool {
        self.get_errors().is_empty()
    }
    /// Call `on_valid` with the values when valid. Returns whether it was called.
    fn handle_submit(&self, on_valid: &dyn Fn(&Value)) -> bool {
        if !self.is_valid() {
            tracing::debug!(
                target: "formwright::form",
                errors = self.get_errors().len(),
                "submit blocked by errors"
            );
            return false;
        }
        on_valid(&self.get_values());
        true
    }
}

/// In-memory [`FormAdapter`].
#[derive(Clone, Default)]
pub struct FormStore {
    initial: Value,
    values: Value,
    errors: BTreeMap<String, String>,
    registered: BTreeSet<String>,
    watchers: Vec<(WatchId, WatchCallback)>,
    next_watch: u64,
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("registered", &self.registered)
            .field("watchers", &self.watchers.len())
            .finish()
    }
}

impl FormStore {
    /// A store starting at `initial` (non-objects start empty).
    pub fn new(initial: Value) -> Self {
        let initial = if initial.is_object() {
            initial
        } else {
            Value::Object(Map::new())
        };
        Self {
            values: initial.clone(),
            initial,
            ..Self::default()
        }
    }

    /// A store seeded with the initial values of `schema`'s fields.
    pub fn from_schema(schema: &SchemaNode) -> Self {
        Self::new(build_initial_values(schema))
    }

    /// A store seeded from extracted fields, with every field registered.
    pub fn from_fields(fields: &[FieldDescriptor]) -> Self {
        let mut store = Self::new(initial_values_for(fields));
        store
            .registered
            .extend(fields.iter().map(|f| f.path.clone()));
        store
    }

    /// Registered field names.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.registered.iter().map(String::as_str)
    }
}

impl FormAdapter for FormStore {
    fn get_values(&self) -> Value {
        self.values.clone()
    }

    fn get_value(&self, name: &str) -> Option<Value> {
        get_path(&self.values, name).ok().flatten()
    }

    fn set_value(&mut self, name: &str, value: Value) {
        set_path(&mut self.values, name, value.clone());
        for (_, watcher) in &self.watchers {
            watcher(name, &value);
        }
    }

    fn watch(&mut self, callback: WatchCallback) -> WatchId {
        let id = WatchId(self.next_watch);
        self.next_watch += 1;
        self.watchers.push((id, callback));
        id
    }

    fn unwatch(&mut self, id: WatchId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|(w, _)| *w != id);
        self.watchers.len() != before
    }

    fn reset(&mut self, values: Option<Value>) {
        self.values = match values {
            Some(v @ Value::Object(_)) => v,
            _ => self.initial.clone(),
        };
        self.errors.clear();
    }

    fn register(&mut self, name: &str) {
        if self.get_value(name).is_none() {
            let seed = get_path(&self.initial, name)
                .ok()
                .flatten()
                .unwrap_or(Value::Null);
            set_path(&mut self.values, name, seed);
        }
        self.registered.insert(name.to_owned());
    }

    fn unregister(&mut self, name: &str) -> bool {
        self.errors.remove(name);
        self.registered.remove(name)
    }

    fn get_errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    fn set_error(&mut self, name: &str, message: String) {
        self.errors.insert(name.to_owned(), message);
    }

    fn clear_errors(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.errors.remove(name);
            }
            None => self.errors.clear(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/form/adapter.rs"]
mod tests;
