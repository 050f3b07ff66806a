use crate::registry::catalog;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Closed set of component kinds. Selects default props and the renderer that wraps a spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    /// An input bound to a form value.
    #[default]
    Field,
    /// Wrapper around one field (label, help text, error slot).
    FieldWrapper,
    /// Layout container; transparent for naming.
    Container,
    /// The form root.
    FormContainer,
    /// Label/text-only node.
    Content,
    /// Decoration attached to a field.
    Addon,
    /// Entry of a menu.
    MenuItem,
    /// Menu holding menu items.
    MenuContainer,
}

impl ComponentType {
    /// Every variant, in declaration order.
    pub const ALL: [ComponentType; 8] = [
        ComponentType::Field,
        ComponentType::FieldWrapper,
        ComponentType::Container,
        ComponentType::FormContainer,
        ComponentType::Content,
        ComponentType::Addon,
        ComponentType::MenuItem,
        ComponentType::MenuContainer,
    ];

    /// Canonical kebab-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Field => "field",
            ComponentType::FieldWrapper => "field-wrapper",
            ComponentType::Container => "container",
            ComponentType::FormContainer => "form-container",
            ComponentType::Content => "content",
            ComponentType::Addon => "addon",
            ComponentType::MenuItem => "menu-item",
            ComponentType::MenuContainer => "menu-container",
        }
    }

    /// Props every spec of this type starts from.
    pub fn default_props(self) -> Map<String, Value> {
        let mut props = Map::new();
        if self == ComponentType::Field {
            props.insert("fullWidth".to_owned(), Value::Bool(true));
        }
        props
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-specific constructor attached to a spec. The core never calls it.
pub type ComponentFactory = Arc<dyn Any + Send + Sync>;

/// Resolved description of what to instantiate for a schema node.
///
/// Specs are shared behind `Arc` and never mutated; overrides produce new specs.
#[derive(Clone)]
pub struct ComponentSpec {
    /// Registry key.
    pub id: String,
    /// Component kind.
    pub component_type: ComponentType,
    /// Optional host constructor.
    pub factory: Option<ComponentFactory>,
    /// Props applied before anything else.
    pub default_props: Map<String, Value>,
    /// Human-readable name.
    pub display_name: String,
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("id", &self.id)
            .field("component_type", &self.component_type)
            .field("factory", &self.factory.as_ref().map(|_| ".."))
            .field("default_props", &self.default_props)
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl ComponentSpec {
    /// A spec with the type's default props and `id` as display name.
    pub fn new(id: impl Into<String>, component_type: ComponentType) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            component_type,
            factory: None,
            default_props: component_type.default_props(),
        }
    }

    /// Replace the default props.
    pub fn with_default_props(mut self, props: Map<String, Value>) -> Self {
        self.default_props = props;
        self
    }

    /// Replace the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Attach a host constructor.
    pub fn with_factory<T: Any + Send + Sync>(mut self, factory: T) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Downcast the host constructor.
    pub fn factory_as<T: Any>(&self) -> Option<&T> {
        self.factory.as_ref()?.downcast_ref::<T>()
    }

    /// Share the spec.
    pub fn shared(self) -> Arc<ComponentSpec> {
        Arc::new(self)
    }
}

/// Component name -> spec.
pub type ComponentMap = HashMap<String, Arc<ComponentSpec>>;

/// Shallow patch over an existing spec. Unset fields keep the original value.
#[derive(Clone, Default)]
pub struct ComponentOverride {
    /// Replacement type.
    pub component_type: Option<ComponentType>,
    /// Replacement default props.
    pub default_props: Option<Map<String, Value>>,
    /// Replacement display name.
    pub display_name: Option<String>,
    /// Replacement host constructor.
    pub factory: Option<ComponentFactory>,
}

impl ComponentOverride {
    fn apply(&self, base: &ComponentSpec) -> ComponentSpec {
        ComponentSpec {
            id: base.id.clone(),
            component_type: self.component_type.unwrap_or(base.component_type),
            factory: self.factory.clone().or_else(|| base.factory.clone()),
            default_props: self
                .default_props
                .clone()
                .unwrap_or_else(|| base.default_props.clone()),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| base.display_name.clone()),
        }
    }
}

/// Three-tier component lookup: local > global > built-in defaults.
///
/// The registry owns only the default tier; global and local maps come from the merged provider
/// configuration of the current render pass.
#[derive(Clone, Debug)]
pub struct ComponentRegistry {
    defaults: ComponentMap,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ComponentRegistry {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        let mut defaults = ComponentMap::new();
        for (name, _) in catalog::INPUTS {
            defaults.insert(
                (*name).to_owned(),
                ComponentSpec::new(*name, ComponentType::Field).shared(),
            );
        }
        for (name, ty) in catalog::STRUCTURAL {
            defaults.insert((*name).to_owned(), ComponentSpec::new(*name, *ty).shared());
        }
        Self { defaults }
    }

    /// A registry without defaults.
    pub fn empty() -> Self {
        Self {
            defaults: ComponentMap::new(),
        }
    }

    /// The default tier.
    pub fn defaults(&self) -> &ComponentMap {
        &self.defaults
    }

    /// Add or replace a default entry.
    pub fn register_default(&mut self, spec: ComponentSpec) {
        self.defaults.insert(spec.id.clone(), spec.shared());
    }

    /// Patch an existing default entry in place. Returns `false` when `name` is not registered.
    pub fn register_override(&mut self, name: &str, patch: &ComponentOverride) -> bool {
        let Some(base) = self.defaults.get(name) else {
            tracing::warn!(
                target: "formwright::registry",
                component = name,
                "override ignored: component is not registered"
            );
            return false;
        };
        let patched = patch.apply(base).shared();
        self.defaults.insert(name.to_owned(), patched);
        true
    }

    /// Resolve `name`: the first tier that contains it supplies the whole spec.
    pub fn resolve(
        &self,
        name: &str,
        global: Option<&ComponentMap>,
        local: Option<&ComponentMap>,
    ) -> Option<Arc<ComponentSpec>> {
        [local, global, Some(&self.defaults)]
            .into_iter()
            .flatten()
            .filter(|tier| !tier.is_empty())
            .find_map(|tier| tier.get(name))
            .cloned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/component.rs"]
mod tests;
