use crate::config::provider::{ProviderConfig, ProviderStack};
use crate::foundation::error::{FormError, FormResult};
use crate::form::adapter::FormStore;
use crate::reaction::engine::{PendingReactions, ReactionContext, ReactionEngine};
use crate::registry::component::ComponentRegistry;
use crate::registry::renderer::RendererRegistry;
use crate::render::adapter::RuntimeAdapter;
use crate::render::orchestrator::Orchestrator;
use crate::render::props::SubmitHandler;
use crate::schema::fields::{
    FieldDescriptor, TieredClassifier, extract_fields_with, initial_values_for,
};
use crate::schema::node::SchemaNode;
use crate::template::resolver::{NamespaceHandlers, VariableResolver};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tokio_util::sync::CancellationToken;

/// Long-lived state of one rendered form.
///
/// A session owns the provider scopes, the registries and the reaction engine. Each
/// [`FormSession::render`] starts a new render pass; reactions queued for an earlier pass are
/// dropped when they settle.
pub struct FormSession<A: RuntimeAdapter> {
    adapter: A,
    scopes: ProviderStack<A>,
    components: ComponentRegistry,
    renderers: RendererRegistry<A>,
    reactions: ReactionEngine,
    handlers: NamespaceHandlers,
    on_submit: Option<SubmitHandler>,
    session_token: CancellationToken,
    pass_token: CancellationToken,
    passes: u64,
}

impl<A: RuntimeAdapter + 'static> FormSession<A> {
    /// A session over `config` with the built-in registries.
    pub fn new(adapter: A, config: ProviderConfig<A>) -> Self {
        let session_token = CancellationToken::new();
        Self {
            adapter,
            scopes: ProviderStack::new(config),
            components: ComponentRegistry::builtin(),
            renderers: RendererRegistry::default(),
            reactions: ReactionEngine::new(),
            handlers: NamespaceHandlers::new(),
            on_submit: None,
            pass_token: session_token.child_token(),
            session_token,
            passes: 0,
        }
    }
}

impl<A: RuntimeAdapter> FormSession<A> {
    /// Replace the component registry (e.g. one carrying overrides).
    pub fn with_components(mut self, components: ComponentRegistry) -> Self {
        self.components = components;
        self
    }

    /// Replace the renderer registry.
    pub fn with_renderers(mut self, renderers: RendererRegistry<A>) -> Self {
        self.renderers = renderers;
        self
    }

    /// Replace the reaction engine.
    pub fn with_reactions(mut self, reactions: ReactionEngine) -> Self {
        self.reactions = reactions;
        self
    }

    /// Extra template namespaces for rendering and reactions.
    pub fn with_handlers(mut self, handlers: NamespaceHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Submit callback handed to every rendered node.
    pub fn with_on_submit(mut self, handler: SubmitHandler) -> Self {
        self.on_submit = Some(handler);
        self
    }

    /// Provider scopes, for hosts that nest configuration.
    pub fn scopes_mut(&mut self) -> &mut ProviderStack<A> {
        &mut self.scopes
    }

    /// Component registry, for registering defaults and overrides.
    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    /// Reaction engine, for registering imperative reactions.
    pub fn reactions_mut(&mut self) -> &mut ReactionEngine {
        &mut self.reactions
    }

    /// Effective configuration of the innermost scope.
    pub fn config(&self) -> ProviderConfig<A> {
        self.scopes.merged()
    }

    /// Number of render passes started so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Token of the current render pass.
    pub fn pass_token(&self) -> &CancellationToken {
        &self.pass_token
    }

    fn schema_of(config: &ProviderConfig<A>) -> FormResult<&SchemaNode> {
        config
            .schema
            .as_ref()
            .ok_or_else(|| FormError::validation("no schema configured for this session"))
    }

    /// The configured schema with templates substituted, as a render pass would see it.
    fn substituted_schema<'c>(
        &self,
        config: &'c ProviderConfig<A>,
        form_state: &Value,
    ) -> FormResult<Cow<'c, SchemaNode>> {
        let schema = Self::schema_of(config)?;
        let external_context = config.external_context_value();
        let resolver = VariableResolver::new(&external_context, form_state);
        let mut substituted = if self.handlers.is_empty() {
            schema.substituted(&resolver)?
        } else {
            schema.substituted(&resolver.with_handlers(&self.handlers))?
        };
        if let Cow::Owned(node) = &mut substituted {
            restore_reactions(node, schema);
        }
        Ok(substituted)
    }

    /// Fields of the configured schema before any value is entered.
    pub fn fields(&self) -> FormResult<Vec<FieldDescriptor>> {
        self.fields_for(&Value::Object(Map::new()))
    }

    /// Fields as a render pass over `form_state` would name them.
    ///
    /// Templated `component-name`s are substituted first, so classification matches rendering.
    pub fn fields_for(&self, form_state: &Value) -> FormResult<Vec<FieldDescriptor>> {
        let config = self.config();
        let schema = self.substituted_schema(&config, form_state)?;
        let classifier = TieredClassifier {
            registry: &self.components,
            global: Some(&config.components),
            local: None,
        };
        Ok(extract_fields_with(&schema, &classifier))
    }

    /// Initial values keyed by the same dotted names the render pass assigns.
    pub fn initial_values(&self) -> FormResult<Value> {
        Ok(initial_values_for(&self.fields()?))
    }

    /// A form store seeded with the initial values, every field registered.
    pub fn form_store(&self) -> FormResult<FormStore> {
        Ok(FormStore::from_fields(&self.fields()?))
    }

    /// Start a new render pass over the configured schema.
    ///
    /// The previous pass is cancelled first, so its pending reactions settle to nothing.
    #[tracing::instrument(level = "debug", skip_all, fields(pass = self.passes + 1))]
    pub fn render(&mut self, form_state: &Value) -> FormResult<Option<A::Output>> {
        self.pass_token.cancel();
        self.pass_token = self.session_token.child_token();
        self.passes += 1;

        let config = self.scopes.merged();
        let schema = Self::schema_of(&config)?;
        let mut orchestrator = Orchestrator::new(
            &self.adapter,
            &self.components,
            &self.renderers,
            &config,
            None,
            form_state,
        );
        if !self.handlers.is_empty() {
            orchestrator = orchestrator.with_handlers(&self.handlers);
        }
        if let Some(handler) = &self.on_submit {
            orchestrator = orchestrator.with_on_submit(handler.clone());
        }
        orchestrator.render_form(schema)
    }

    /// React to a form-state change: run imperative reactions now and queue declarative ones
    /// against the current render pass.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn react(&self, form_state: &Value) -> FormResult<PendingReactions> {
        let config = self.config();
        let schema = self.substituted_schema(&config, form_state)?;
        let ctx = ReactionContext::new(form_state.clone(), config.external_context_value())
            .with_handlers(self.handlers.clone());

        self.reactions.run_imperative(&ctx);

        let classifier = TieredClassifier {
            registry: &self.components,
            global: Some(&config.components),
            local: None,
        };
        let pending =
            self.reactions
                .collect_declarative_with(&schema, &classifier, &ctx, &self.pass_token);
        if config.debug.is_enabled("reaction") {
            tracing::debug!(
                target: "formwright::reaction",
                queued = pending.len(),
                pass = self.passes,
                "declarative reactions queued"
            );
        }
        Ok(pending)
    }

    /// Cancel every pass of this session; nothing queued so far will settle.
    pub fn close(&self) {
        self.session_token.cancel();
    }
}

/// Reaction maps are expressions in their own right; put back what substitution rewrote.
fn restore_reactions(node: &mut SchemaNode, raw: &SchemaNode) {
    node.reactions.clone_from(&raw.reactions);
    let (Some(children), Some(raw_children)) = (&mut node.properties, &raw.properties) else {
        return;
    };
    for (key, child) in children {
        if let Some(raw_child) = raw_children.get(key) {
            restore_reactions(child, raw_child);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
