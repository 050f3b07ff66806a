use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Callback invoked with the form values when a form container submits.
pub type SubmitHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Props handed to middlewares, renderers and the runtime adapter.
///
/// Everything serializable lives in `fields`; callbacks are carried next to it.
#[derive(Clone, Default)]
pub struct Props {
    /// Plain JSON props.
    pub fields: Map<String, Value>,
    /// Submit callback forwarded to every node of the pass.
    pub on_submit: Option<SubmitHandler>,
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("fields", &self.fields)
            .field("on_submit", &self.on_submit.as_ref().map(|_| ".."))
            .finish()
    }
}

impl From<Map<String, Value>> for Props {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            on_submit: None,
        }
    }
}

impl Props {
    /// Empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one prop.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set one prop, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Remove one prop.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Spread `other` over these props; keys in `other` win.
    pub fn extend(&mut self, other: &Map<String, Value>) {
        for (k, v) in other {
            self.fields.insert(k.clone(), v.clone());
        }
    }

    /// The `name` prop, when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Attach a submit callback.
    pub fn with_on_submit(mut self, handler: SubmitHandler) -> Self {
        self.on_submit = Some(handler);
        self
    }

    /// Invoke the submit callback, if any. Returns whether one was present.
    pub fn submit(&self, values: &Value) -> bool {
        match &self.on_submit {
            Some(handler) => {
                handler(values);
                true
            }
            None => false,
        }
    }
}
