use crate::registry::component::{ComponentSpec, ComponentType};
use crate::render::props::{Props, SubmitHandler};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Host-framework bridge that turns abstract instantiation requests into real UI nodes.
///
/// The orchestrator never builds nodes itself; every node of a render result comes from one of
/// these calls.
pub trait RuntimeAdapter {
    /// Opaque node type of the host framework.
    type Output: Clone;

    /// Instantiate `spec` with `props` and already rendered `children`.
    fn create(&self, spec: &ComponentSpec, props: Props, children: Vec<Self::Output>)
    -> Self::Output;

    /// Group `children` without a wrapping component.
    fn fragment(&self, children: Vec<Self::Output>) -> Self::Output;

    /// Whether `value` is a node this adapter produced.
    fn is_valid_element(&self, value: &Self::Output) -> bool;

    /// Direct children of a node.
    fn get_children(&self, value: &Self::Output) -> Vec<Self::Output>;

    /// Return a copy of `value` with `props` spread over its props.
    fn set_props(&self, value: Self::Output, props: &Map<String, Value>) -> Self::Output;
}

/// A node produced by [`TreeAdapter`].
#[derive(Clone, Serialize)]
pub struct Element {
    /// Component id, or `"#fragment"` for fragments.
    pub component: String,
    /// Component type; `None` for fragments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<ComponentType>,
    /// Final props.
    pub props: Map<String, Value>,
    /// Rendered children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
    #[serde(skip)]
    on_submit: Option<SubmitHandler>,
}

const FRAGMENT: &str = "#fragment";

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("component", &self.component)
            .field("component_type", &self.component_type)
            .field("props", &self.props)
            .field("children", &self.children)
            .finish()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component
            && self.component_type == other.component_type
            && self.props == other.props
            && self.children == other.children
    }
}

impl Element {
    /// Whether this node is a fragment.
    pub fn is_fragment(&self) -> bool {
        self.component_type.is_none() && self.component == FRAGMENT
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }

    /// First node (pre-order) instantiated from `component`.
    pub fn find(&self, component: &str) -> Option<&Element> {
        self.descendants()
            .into_iter()
            .find(|e| e.component == component)
    }

    /// First field node whose `name` prop equals `name`.
    pub fn find_field(&self, name: &str) -> Option<&Element> {
        self.descendants().into_iter().find(|e| {
            e.component_type == Some(ComponentType::Field)
                && e.props.get("name").and_then(Value::as_str) == Some(name)
        })
    }

    /// `name` props of every field node, in render order.
    pub fn field_names(&self) -> Vec<String> {
        self.descendants()
            .into_iter()
            .filter(|e| e.component_type == Some(ComponentType::Field))
            .filter_map(|e| e.props.get("name").and_then(Value::as_str))
            .map(str::to_owned)
            .collect()
    }

    /// Component ids of the direct children.
    pub fn child_components(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.component.as_str()).collect()
    }

    /// Invoke the submit callback carried by this node.
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

/// Headless adapter that records the render result as a serializable [`Element`] tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeAdapter;

impl RuntimeAdapter for TreeAdapter {
    type Output = Element;

    fn create(&self, spec: &ComponentSpec, props: Props, children: Vec<Element>) -> Element {
        Element {
            component: spec.id.clone(),
            component_type: Some(spec.component_type),
            props: props.fields,
            children,
            on_submit: props.on_submit,
        }
    }

    fn fragment(&self, children: Vec<Element>) -> Element {
        Element {
            component: FRAGMENT.to_owned(),
            component_type: None,
            props: Map::new(),
            children,
            on_submit: None,
        }
    }

    fn is_valid_element(&self, value: &Element) -> bool {
        value.is_fragment() || value.component_type.is_some()
    }

    fn get_children(&self, value: &Element) -> Vec<Element> {
        value.children.clone()
    }

    fn set_props(&self, mut value: Element, props: &Map<String, Value>) -> Element {
        for (k, v) in props {
            value.props.insert(k.clone(), v.clone());
        }
        value
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/adapter.rs"]
mod tests;
