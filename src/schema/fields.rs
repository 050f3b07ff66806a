use crate::foundation::value::{join_path, set_path};
use crate::registry::catalog;
use crate::registry::component::{ComponentMap, ComponentRegistry, ComponentType};
use crate::schema::naming::{NodePosition, ROOT_KEY, node_name};
use crate::schema::node::{SchemaNode, UiMeta};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of value an input edits; decides its initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Free text and single choices.
    Text,
    /// Numbers; start out unset.
    Number,
    /// Checkboxes and switches.
    Boolean,
    /// Multiple choices.
    MultiSelect,
}

impl FieldKind {
    /// Initial value written by [`build_initial_values`]. Numbers start as `null`.
    pub fn initial_value(self) -> Value {
        match self {
            FieldKind::Text => Value::String(String::new()),
            FieldKind::Number => Value::Null,
            FieldKind::Boolean => Value::Bool(false),
            FieldKind::MultiSelect => Value::Array(Vec::new()),
        }
    }
}

/// A flattened field of a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Property key of the input node.
    pub key: String,
    /// Dotted name, identical to the `name` prop the orchestrator assigns.
    pub path: String,
    /// Component name of the input.
    pub component: String,
    /// Value kind.
    pub kind: FieldKind,
    /// Input metadata layered over its wrapper's metadata.
    pub ui: UiMeta,
    /// Validation rules declared on the input.
    pub rules: Vec<String>,
    /// Declarative reactions declared on the input.
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub reactions: std::collections::BTreeMap<String, String>,
    /// `false` when some ancestor is hidden, which prunes the field from the render.
    pub ancestors_visible: bool,
}

impl FieldDescriptor {
    /// Whether the field is rendered: its own (or its wrapper's) flag and every ancestor's.
    pub fn is_visible(&self) -> bool {
        self.ancestors_visible && self.ui.is_visible()
    }
}

/// Tells the extractor what type a component name has.
pub trait ComponentClassifier {
    /// `None` when the name does not resolve.
    fn component_type(&self, name: &str) -> Option<ComponentType>;

    /// Value kind for a field component; non-catalog fields edit text.
    fn field_kind(&self, name: &str) -> FieldKind {
        catalog::input_kind(name).unwrap_or(FieldKind::Text)
    }
}

/// Classifies by the built-in catalog only.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinCatalog;

impl ComponentClassifier for BuiltinCatalog {
    fn component_type(&self, name: &str) -> Option<ComponentType> {
        catalog::builtin_type(name)
    }
}

impl ComponentClassifier for ComponentRegistry {
    fn component_type(&self, name: &str) -> Option<ComponentType> {
        self.resolve(name, None, None).map(|spec| spec.component_type)
    }
}

/// Classifies the way a render pass resolves: local > global > registry defaults.
pub struct TieredClassifier<'a> {
    /// Registry holding the default tier.
    pub registry: &'a ComponentRegistry,
    /// Global tier.
    pub global: Option<&'a ComponentMap>,
    /// Local tier.
    pub local: Option<&'a ComponentMap>,
}

impl ComponentClassifier for TieredClassifier<'_> {
    fn component_type(&self, name: &str) -> Option<ComponentType> {
        self.registry
            .resolve(name, self.global, self.local)
            .map(|spec| spec.component_type)
    }
}

/// Every field of `schema`, classified by the built-in catalog.
pub fn extract_fields(schema: &SchemaNode) -> Vec<FieldDescriptor> {
    extract_fields_with(schema, &BuiltinCatalog)
}

/// Every field of `schema`, in sibling order, classified by `classifier`.
///
/// Unresolved components are skipped together with their subtree, as the orchestrator does.
/// Hidden fields are kept so they still get initial values.
pub fn extract_fields_with<C>(schema: &SchemaNode, classifier: &C) -> Vec<FieldDescriptor>
where
    C: ComponentClassifier + ?Sized,
{
    let mut out = Vec::new();
    let start = Walk {
        parent_name: None,
        position: NodePosition::Root,
        wrapper_ui: None,
        ancestors_visible: true,
    };
    walk(ROOT_KEY, schema, start, classifier, &mut out);
    out
}

#[derive(Clone, Copy)]
struct Walk<'a> {
    parent_name: Option<&'a str>,
    position: NodePosition,
    wrapper_ui: Option<&'a UiMeta>,
    ancestors_visible: bool,
}

fn walk<C>(
    key: &str,
    node: &SchemaNode,
    at: Walk<'_>,
    classifier: &C,
    out: &mut Vec<FieldDescriptor>,
) where
    C: ComponentClassifier + ?Sized,
{
    let component = node.component_or(key);
    let Some(ty) = classifier.component_type(component) else {
        return;
    };

    if ty == ComponentType::Field {
        let ui = match at.wrapper_ui {
            Some(fallback) => node.ui.or(fallback),
            None => node.ui.clone(),
        };
        out.push(FieldDescriptor {
            key: key.to_owned(),
            path: join_path(at.parent_name, key),
            component: component.to_owned(),
            kind: classifier.field_kind(component),
            ui,
            rules: node.rules.clone(),
            reactions: node.reactions.clone(),
            ancestors_visible: at.ancestors_visible,
        });
    }

    let name = node_name(at.parent_name, key, ty, at.position);
    let next = Walk {
        parent_name: name.as_deref(),
        position: at.position.of_children(ty),
        wrapper_ui: (ty == ComponentType::FieldWrapper).then_some(&node.ui),
        ancestors_visible: at.ancestors_visible && node.ui.is_visible(),
    };
    for (child_key, child) in node.sorted_children() {
        walk(child_key, child, next, classifier, out);
    }
}

/// Nested object holding each field's initial value at its dotted path.
pub fn build_initial_values(schema: &SchemaNode) -> Value {
    initial_values_for(&extract_fields(schema))
}

/// [`build_initial_values`] over an already extracted field list.
pub fn initial_values_for(fields: &[FieldDescriptor]) -> Value {
    let mut root = Value::Object(Map::new());
    for field in fields {
        set_path(&mut root, &field.path, field.kind.initial_value());
    }
    root
}

#[cfg(test)]
#[path = "../../tests/unit/schema/fields.rs"]
mod tests;
