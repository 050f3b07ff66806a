use crate::render::props::Props;
use crate::schema::node::SchemaNode;
use crate::template::processor::{needs_processing, process_map};
use crate::template::resolver::{NamespaceHandlers, VariableResolver};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// State a middleware may consult. Never mutated by the pipeline.
#[derive(Clone, Copy)]
pub struct MiddlewareContext<'a> {
    /// Provider external context.
    pub external_context: &'a Value,
    /// Current form values.
    pub form_state: &'a Value,
    /// Extra template namespaces.
    pub handlers: Option<&'a NamespaceHandlers>,
    /// Property key of the node being rendered.
    pub component_key: &'a str,
}

impl<'a> MiddlewareContext<'a> {
    /// Resolver over this context's state.
    pub fn resolver(&self) -> VariableResolver<'a> {
        let resolver = VariableResolver::new(self.external_context, self.form_state);
        match self.handlers {
            Some(h) => resolver.with_handlers(h),
            None => resolver,
        }
    }
}

/// A pure prop transform applied after template substitution, before rendering.
pub trait Middleware: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Produce the next props from the accumulated ones. An error skips this step.
    fn apply(
        &self,
        props: &Props,
        schema: &SchemaNode,
        ctx: &MiddlewareContext<'_>,
    ) -> anyhow::Result<Props>;
}

impl<F> Middleware for F
where
    F: Fn(&Props, &SchemaNode, &MiddlewareContext<'_>) -> anyhow::Result<Props> + Send + Sync,
{
    fn apply(
        &self,
        props: &Props,
        schema: &SchemaNode,
        ctx: &MiddlewareContext<'_>,
    ) -> anyhow::Result<Props> {
        self(props, schema, ctx)
    }
}

/// Shared middleware handle.
pub type SharedMiddleware = Arc<dyn Middleware>;

/// A closure middleware with a name for logging.
pub struct NamedMiddleware<F> {
    name: String,
    f: F,
}

impl<F> Middleware for NamedMiddleware<F>
where
    F: Fn(&Props, &SchemaNode, &MiddlewareContext<'_>) -> anyhow::Result<Props> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(
        &self,
        props: &Props,
        schema: &SchemaNode,
        ctx: &MiddlewareContext<'_>,
    ) -> anyhow::Result<Props> {
        (self.f)(props, schema, ctx)
    }
}

/// Wrap a closure as a named middleware.
pub fn named<F>(name: impl Into<String>, f: F) -> SharedMiddleware
where
    F: Fn(&Props, &SchemaNode, &MiddlewareContext<'_>) -> anyhow::Result<Props>
        + Send
        + Sync
        + 'static,
{
    Arc::new(NamedMiddleware {
        name: name.into(),
        f,
    })
}

/// Template substitution over the whole props bag, using the context's state.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateMiddleware;

impl Middleware for TemplateMiddleware {
    fn name(&self) -> &str {
        "template"
    }

    fn apply(
        &self,
        props: &Props,
        _schema: &SchemaNode,
        ctx: &MiddlewareContext<'_>,
    ) -> anyhow::Result<Props> {
        if !props.fields.values().any(needs_processing) {
            return Ok(props.clone());
        }
        let fields: Map<String, Value> = process_map(&props.fields, &ctx.resolver())?;
        Ok(Props {
            fields,
            on_submit: props.on_submit.clone(),
        })
    }
}

/// Left fold of `middlewares` over `props`. A failing middleware is logged and skipped.
pub fn apply_all(
    props: Props,
    schema: &SchemaNode,
    middlewares: &[SharedMiddleware],
    ctx: &MiddlewareContext<'_>,
) -> Props {
    middlewares
        .iter()
        .fold(props, |acc, mw| match mw.apply(&acc, schema, ctx) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(
                    target: "formwright::middleware",
                    middleware = mw.name(),
                    component = ctx.component_key,
                    error = %e,
                    "middleware failed; keeping previous props"
                );
                acc
            }
        })
}

/// Named middlewares in registration order.
///
/// Owned by the application instance and handed to a provider scope explicitly.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: Vec<(String, SharedMiddleware)>,
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl MiddlewareRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `middleware` under `name`, replacing an earlier one in place.
    pub fn register(&mut self, name: impl Into<String>, middleware: SharedMiddleware) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = middleware,
            None => self.entries.push((name, middleware)),
        }
    }

    /// Remove `name`. Returns whether it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        before != self.entries.len()
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// The middlewares in registration order.
    pub fn ordered(&self) -> Vec<SharedMiddleware> {
        self.entries.iter().map(|(_, m)| m.clone()).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/middleware/pipeline.rs"]
mod tests;
