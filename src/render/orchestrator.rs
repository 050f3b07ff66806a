use crate::config::provider::{DebugFlags, ProviderConfig};
use crate::foundation::error::FormResult;
use crate::middleware::pipeline::{
    MiddlewareContext, SharedMiddleware, TemplateMiddleware, apply_all,
};
use crate::registry::component::{ComponentMap, ComponentRegistry};
use crate::registry::renderer::{RendererRegistry, RendererTable};
use crate::render::adapter::RuntimeAdapter;
use crate::render::props::{Props, SubmitHandler};
use crate::schema::naming::{NodePosition, ROOT_KEY, node_name};
use crate::schema::node::SchemaNode;
use crate::template::resolver::{NamespaceHandlers, VariableResolver};
use serde_json::Value;
use std::sync::Arc;

/// Prop carrying the provider external context to every node.
pub const EXTERNAL_CONTEXT_PROP: &str = "externalContext";

/// Turns a schema tree into runtime-adapter output for one render pass.
///
/// Holds everything the pass reads: registries, the layered renderer table, the middleware
/// chain and the state bags. Nothing here is mutated while rendering.
pub struct Orchestrator<'a, A: RuntimeAdapter> {
    adapter: &'a A,
    components: &'a ComponentRegistry,
    global: Option<&'a ComponentMap>,
    local: Option<&'a ComponentMap>,
    renderers: RendererTable<A>,
    middlewares: Vec<SharedMiddleware>,
    external_context: Value,
    form_state: &'a Value,
    handlers: Option<&'a NamespaceHandlers>,
    debug: DebugFlags,
    on_submit: Option<SubmitHandler>,
}

impl<'a, A: RuntimeAdapter> Orchestrator<'a, A> {
    /// Set up a pass over the `global` provider scope and an optional `local` one.
    pub fn new(
        adapter: &'a A,
        components: &'a ComponentRegistry,
        renderers: &'a RendererRegistry<A>,
        global: &'a ProviderConfig<A>,
        local: Option<&'a ProviderConfig<A>>,
        form_state: &'a Value,
    ) -> Self {
        let merged = local.map(|l| ProviderConfig::merge(global, l));
        let scope = merged.as_ref().unwrap_or(global);

        let mut middlewares: Vec<SharedMiddleware> = vec![Arc::new(TemplateMiddleware)];
        middlewares.extend(scope.middlewares.iter().cloned());

        Self {
            adapter,
            components,
            global: Some(&global.components),
            local: local.map(|l| &l.components),
            renderers: renderers
                .merged_registry(Some(&global.renderers), local.map(|l| &l.renderers)),
            middlewares,
            external_context: scope.external_context_value(),
            form_state,
            handlers: None,
            debug: scope.debug.clone(),
            on_submit: None,
        }
    }

    /// Consult `handlers` for extra template namespaces.
    pub fn with_handlers(mut self, handlers: &'a NamespaceHandlers) -> Self {
        self.handlers = Some(handlers);
        self
    }

    /// Hand `handler` to every node as its submit callback.
    pub fn with_on_submit(mut self, handler: SubmitHandler) -> Self {
        self.on_submit = Some(handler);
        self
    }

    /// External context as seen by templates and components.
    pub fn external_context(&self) -> &Value {
        &self.external_context
    }

    /// Render a whole form: `schema` is the root and its direct properties are named.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn render_form(&self, schema: &SchemaNode) -> FormResult<Option<A::Output>> {
        self.render_at(ROOT_KEY, schema, &Props::new(), NodePosition::Root)
    }

    /// Render the subtree `schema` under `component_key`.
    ///
    /// `is_direct_root_property` marks a node sitting directly below a form-container root.
    pub fn render(
        &self,
        component_key: &str,
        schema: &SchemaNode,
        parent_props: &Props,
        is_direct_root_property: bool,
    ) -> FormResult<Option<A::Output>> {
        self.render_at(
            component_key,
            schema,
            parent_props,
            NodePosition::from_root_property_flag(is_direct_root_property),
        )
    }

    /// Render the subtree `schema` at an explicit position.
    ///
    /// Templates are substituted over the whole subtree first. A path traversal failure there is
    /// the only error returned; unresolved components and failing middlewares only log.
    #[tracing::instrument(level = "debug", skip(self, schema, parent_props))]
    pub fn render_at(
        &self,
        component_key: &str,
        schema: &SchemaNode,
        parent_props: &Props,
        position: NodePosition,
    ) -> FormResult<Option<A::Output>> {
        let processed = schema.substituted(&self.resolver())?;
        Ok(self.render_node(component_key, &processed, parent_props, position))
    }

    fn resolver(&self) -> VariableResolver<'_> {
        let resolver = VariableResolver::new(&self.external_context, self.form_state);
        match self.handlers {
            Some(h) => resolver.with_handlers(h),
            None => resolver,
        }
    }

    fn render_node(
        &self,
        key: &str,
        schema: &SchemaNode,
        parent_props: &Props,
        position: NodePosition,
    ) -> Option<A::Output> {
        if !schema.ui.is_visible() {
            self.trace_node(key, "pruned: not visible");
            return None;
        }

        let component = schema.component_or(key);
        let Some(spec) = self.components.resolve(component, self.global, self.local) else {
            tracing::warn!(
                target: "formwright::registry",
                component,
                key,
                "component not found in any registry tier"
            );
            return None;
        };
        let ty = spec.component_type;
        let renderer = self.renderers.get(ty).clone();
        let name = node_name(parent_props.name(), key, ty, position);

        let mut props = Props::from(spec.default_props.clone());
        props.extend(&parent_props.fields);
        props.on_submit = parent_props.on_submit.clone();
        if let Some(name) = &name {
            props.insert("name", Value::String(name.clone()));
        }
        if !schema.component_props.is_empty() {
            props.extend(&schema.component_props);
        }
        props.insert("ui", schema.ui.to_value());
        if let Some(content) = &schema.content {
            props.insert("content", Value::String(content.clone()));
        }
        props.insert(EXTERNAL_CONTEXT_PROP, self.external_context.clone());
        if let Some(handler) = &self.on_submit {
            props.on_submit = Some(handler.clone());
        }

        let ctx = MiddlewareContext {
            external_context: &self.external_context,
            form_state: self.form_state,
            handlers: self.handlers,
            component_key: key,
        };
        let props = apply_all(props, schema, &self.middlewares, &ctx);
        if self.debug.is_enabled("middleware") {
            tracing::debug!(
                target: "formwright::middleware",
                key,
                props = ?props.fields,
                "props after middleware"
            );
        }

        let child_position = position.of_children(ty);
        let children: Vec<A::Output> = schema
            .sorted_children()
            .into_iter()
            .filter_map(|(child_key, child)| {
                self.render_node(child_key, child, &props, child_position)
            })
            .collect();

        if self.debug.is_enabled("render") {
            tracing::debug!(
                target: "formwright::render",
                key,
                component = %spec.id,
                component_type = %ty,
                name = name.as_deref().unwrap_or(""),
                children = children.len(),
                "render node"
            );
        }

        Some(renderer.render(&spec, props, self.adapter, children))
    }

    fn trace_node(&self, key: &str, what: &str) {
        if self.debug.is_enabled("render") {
            tracing::debug!(target: "formwright::render", key, "{what}");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
