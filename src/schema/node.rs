use crate::foundation::error::{FormError, FormResult};
use crate::template::processor::{needs_processing, process};
use crate::template::resolver::ResolveVariable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One node of the declarative form tree.
///
/// Besides the keys modelled here, any other JSON-Schema keys (`type`, `title`, `default`, ...)
/// are kept in [`SchemaNode::extra`] and survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Name of the component to resolve for this node. Falls back to the property key.
    #[serde(
        rename = "component-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub component_name: Option<String>,

    /// Child nodes by key. Iteration order carries no meaning; `ui.order` does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaNode>>,

    /// Presentation metadata.
    #[serde(default, skip_serializing_if = "UiMeta::is_empty")]
    pub ui: UiMeta,

    /// Opaque bag forwarded to the instantiated component.
    #[serde(
        rename = "component-props",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub component_props: Map<String, Value>,

    /// Literal or templated text for label/content-only nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Validation rule declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,

    /// Declarative reactions: prop name -> expression.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reactions: BTreeMap<String, String>,

    /// Remaining JSON-Schema keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `ui` metadata bag of a [`SchemaNode`].
///
/// Kept as raw JSON so templated `order`/`visible` values survive until substitution; the
/// accessors interpret them leniently afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiMeta {
    /// `order`, `visible`, label, placeholder and any other presentation fields.
    pub fields: Map<String, Value>,
}

impl From<Map<String, Value>> for UiMeta {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl UiMeta {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One raw field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Sort key among siblings. Numbers and numeric strings count; anything else is unset.
    pub fn order(&self) -> Option<f64> {
        match self.fields.get("order")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
            _ => None,
        }
    }

    /// Visibility flag. Booleans and `"true"`/`"false"` count; anything else is unset.
    pub fn visible(&self) -> Option<bool> {
        match self.fields.get("visible")? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Visibility defaults to `true`; only an explicit `false` prunes.
    pub fn is_visible(&self) -> bool {
        self.visible() != Some(false)
    }

    /// `order`, with a missing value sorting after every present one.
    pub fn order_key(&self) -> f64 {
        self.order().unwrap_or(f64::INFINITY)
    }

    /// Overlay `self` on top of `fallback`: fields set here win, the rest come from `fallback`.
    pub fn or(&self, fallback: &UiMeta) -> UiMeta {
        let mut fields = fallback.fields.clone();
        for (k, v) in &self.fields {
            fields.insert(k.clone(), v.clone());
        }
        UiMeta { fields }
    }

    /// The metadata as a JSON object, as handed to components under the `ui` prop.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl SchemaNode {
    /// Parse a schema tree from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FormResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FormError::validation(format!("parse form schema JSON: {e}")))
    }

    /// Parse a schema tree from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FormResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FormError::validation(format!("open form schema JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a schema tree from a JSON string.
    pub fn from_json_str(s: &str) -> FormResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| FormError::validation(format!("parse form schema JSON: {e}")))
    }

    /// Parse a schema tree from an already-decoded JSON value.
    pub fn from_value(v: Value) -> FormResult<Self> {
        serde_json::from_value(v)
            .map_err(|e| FormError::serde(format!("decode schema node: {e}")))
    }

    /// The node as a JSON value.
    pub fn to_value(&self) -> FormResult<Value> {
        serde_json::to_value(self).map_err(|e| FormError::serde(format!("encode schema node: {e}")))
    }

    /// The subtree with every template substituted; borrowed when it has no markers.
    pub fn substituted<R>(&self, resolver: &R) -> FormResult<Cow<'_, SchemaNode>>
    where
        R: ResolveVariable + ?Sized,
    {
        let raw = self.to_value()?;
        if !needs_processing(&raw) {
            return Ok(Cow::Borrowed(self));
        }
        let processed = process(&raw, resolver)?;
        Ok(Cow::Owned(Self::from_value(processed.into_owned())?))
    }

    /// `component-name`, or `key` when the node does not name one.
    pub fn component_or<'a>(&'a self, key: &'a str) -> &'a str {
        self.component_name.as_deref().unwrap_or(key)
    }

    /// Children sorted by `ui.order` ascending; missing orders last, ties keep key order.
    pub fn sorted_children(&self) -> Vec<(&str, &SchemaNode)> {
        let mut out: Vec<(&str, &SchemaNode)> = self
            .properties
            .iter()
            .flat_map(|props| props.iter())
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        out.sort_by(|a, b| a.1.ui.order_key().total_cmp(&b.1.ui.order_key()));
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/node.rs"]
mod tests;
