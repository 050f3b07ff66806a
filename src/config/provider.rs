use crate::middleware::pipeline::SharedMiddleware;
use crate::registry::component::{ComponentMap, ComponentSpec, ComponentType};
use crate::registry::renderer::{RendererMap, SharedRenderer};
use crate::render::adapter::RuntimeAdapter;
use crate::schema::node::SchemaNode;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Key of the debug bag that enables every category.
pub const DEBUG_ALL: &str = "all";

/// Debug toggles, `{ "all": bool, "<category>": bool }`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugFlags(Map<String, Value>);

impl DebugFlags {
    /// Flags from a JSON object; non-object values enable nothing.
    pub fn from_value(v: Value) -> Self {
        match v {
            Value::Object(m) => Self(m),
            _ => Self::default(),
        }
    }

    /// Set one category.
    pub fn set(&mut self, category: impl Into<String>, enabled: bool) {
        self.0.insert(category.into(), Value::Bool(enabled));
    }

    /// Whether `category` (or `all`) is switched on.
    pub fn is_enabled(&self, category: &str) -> bool {
        let on = |k: &str| self.0.get(k).and_then(Value::as_bool).unwrap_or(false);
        on(DEBUG_ALL) || on(category)
    }

    /// Shallow merge, `local` wins.
    pub fn merge(global: &Self, local: &Self) -> Self {
        Self(shallow_merge(&global.0, &local.0))
    }

    /// The raw bag.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// One provider scope: `{components, renderers, middlewares, externalContext, debug, schema}`.
pub struct ProviderConfig<A: RuntimeAdapter> {
    /// Component name -> spec.
    pub components: ComponentMap,
    /// Component type -> renderer.
    pub renderers: RendererMap<A>,
    /// Caller middlewares, in execution order.
    pub middlewares: Vec<SharedMiddleware>,
    /// Values exposed under `$externalContext`.
    pub external_context: Map<String, Value>,
    /// Debug toggles.
    pub debug: DebugFlags,
    /// Schema to render, if this scope supplies one.
    pub schema: Option<SchemaNode>,
}

impl<A: RuntimeAdapter> Default for ProviderConfig<A> {
    fn default() -> Self {
        Self {
            components: ComponentMap::new(),
            renderers: RendererMap::new(),
            middlewares: Vec::new(),
            external_context: Map::new(),
            debug: DebugFlags::default(),
            schema: None,
        }
    }
}

impl<A: RuntimeAdapter> Clone for ProviderConfig<A> {
    fn clone(&self) -> Self {
        Self {
            components: self.components.clone(),
            renderers: self.renderers.clone(),
            middlewares: self.middlewares.clone(),
            external_context: self.external_context.clone(),
            debug: self.debug.clone(),
            schema: self.schema.clone(),
        }
    }
}

impl<A: RuntimeAdapter> fmt::Debug for ProviderConfig<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components: Vec<&String> = self.components.keys().collect();
        components.sort();
        let mut renderers: Vec<&str> = self.renderers.keys().map(|t| t.as_str()).collect();
        renderers.sort_unstable();
        f.debug_struct("ProviderConfig")
            .field("components", &components)
            .field("renderers", &renderers)
            .field(
                "middlewares",
                &self.middlewares.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("external_context", &self.external_context)
            .field("debug", &self.debug)
            .field("schema", &self.schema.is_some())
            .finish()
    }
}

impl<A: RuntimeAdapter> ProviderConfig<A> {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a component under its id.
    pub fn with_component(mut self, spec: ComponentSpec) -> Self {
        self.components.insert(spec.id.clone(), Arc::new(spec));
        self
    }

    /// Add or replace the renderer for `ty`.
    pub fn with_renderer(mut self, ty: ComponentType, renderer: SharedRenderer<A>) -> Self {
        self.renderers.insert(ty, renderer);
        self
    }

    /// Append a middleware.
    pub fn with_middleware(mut self, middleware: SharedMiddleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Append several middlewares, keeping their order.
    pub fn with_middlewares(
        mut self,
        middlewares: impl IntoIterator<Item = SharedMiddleware>,
    ) -> Self {
        self.middlewares.extend(middlewares);
        self
    }

    /// Replace the external context. Non-object values are ignored.
    pub fn with_external_context(mut self, context: Value) -> Self {
        if let Value::Object(m) = context {
            self.external_context = m;
        }
        self
    }

    /// Replace the debug bag.
    pub fn with_debug(mut self, debug: DebugFlags) -> Self {
        self.debug = debug;
        self
    }

    /// Supply the schema for this scope.
    pub fn with_schema(mut self, schema: SchemaNode) -> Self {
        self.schema = Some(schema);
        self
    }

    /// `$externalContext` as a JSON value.
    pub fn external_context_value(&self) -> Value {
        Value::Object(self.external_context.clone())
    }

    /// Merge two scopes.
    ///
    /// Maps are right-biased unions, middlewares run `global` first, external context and debug
    /// shallow-merge with `local` winning, and the schema is `local`'s when present. The
    /// operation is associative, so a scope chain can be folded in any grouping.
    pub fn merge(global: &Self, local: &Self) -> Self {
        let mut components = global.components.clone();
        components.extend(local.components.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut renderers = global.renderers.clone();
        renderers.extend(local.renderers.iter().map(|(k, v)| (*k, v.clone())));

        let mut middlewares = global.middlewares.clone();
        middlewares.extend(local.middlewares.iter().cloned());

        Self {
            components,
            renderers,
            middlewares,
            external_context: shallow_merge(&global.external_context, &local.external_context),
            debug: DebugFlags::merge(&global.debug, &local.debug),
            schema: local.schema.clone().or_else(|| global.schema.clone()),
        }
    }
}

fn shallow_merge(global: &Map<String, Value>, local: &Map<String, Value>) -> Map<String, Value> {
    let mut out = global.clone();
    for (k, v) in local {
        out.insert(k.clone(), v.clone());
    }
    out
}

/// Nested provider scopes, outermost first.
pub struct ProviderStack<A: RuntimeAdapter> {
    scopes: Vec<ProviderConfig<A>>,
}

impl<A: RuntimeAdapter> Default for ProviderStack<A> {
    fn default() -> Self {
        Self { scopes: Vec::new() }
    }
}

impl<A: RuntimeAdapter> fmt::Debug for ProviderStack<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.scopes).finish()
    }
}

impl<A: RuntimeAdapter> ProviderStack<A> {
    /// A stack with a single root scope.
    pub fn new(root: ProviderConfig<A>) -> Self {
        Self { scopes: vec![root] }
    }

    /// Enter a nested scope.
    pub fn push(&mut self, scope: ProviderConfig<A>) {
        self.scopes.push(scope);
    }

    /// Leave the innermost scope.
    pub fn pop(&mut self) -> Option<ProviderConfig<A>> {
        self.scopes.pop()
    }

    /// Number of scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Innermost scope, mutable, for hosts that update config in place.
    pub fn innermost_mut(&mut self) -> Option<&mut ProviderConfig<A>> {
        self.scopes.last_mut()
    }

    /// The effective config of the innermost scope.
    pub fn merged(&self) -> ProviderConfig<A> {
        self.scopes
            .iter()
            .fold(ProviderConfig::default(), |acc, scope| {
                ProviderConfig::merge(&acc, scope)
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/provider.rs"]
mod tests;
