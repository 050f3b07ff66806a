use crate::expression::Expression;
use crate::foundation::error::FormResult;
use crate::schema::fields::{BuiltinCatalog, ComponentClassifier, extract_fields_with};
use crate::schema::node::SchemaNode;
use crate::template::resolver::{NamespaceHandlers, VariableResolver};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State a reaction sees. Cheap to clone; queued reactions keep their own copy.
#[derive(Clone, Debug)]
pub struct ReactionContext {
    form_state: Arc<Value>,
    external_context: Arc<Value>,
    handlers: NamespaceHandlers,
}

impl Default for ReactionContext {
    /// Empty form state and external context, so unknown paths resolve to undefined.
    fn default() -> Self {
        Self::new(Value::Object(Map::new()), Value::Object(Map::new()))
    }
}

impl ReactionContext {
    /// Context over the given form values and external context.
    pub fn new(form_state: Value, external_context: Value) -> Self {
        Self {
            form_state: Arc::new(form_state),
            external_context: Arc::new(external_context),
            handlers: NamespaceHandlers::new(),
        }
    }

    /// Extra template namespaces visible to expressions.
    pub fn with_handlers(mut self, handlers: NamespaceHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Current form values.
    pub fn form_state(&self) -> &Value {
        &self.form_state
    }

    /// Provider external context.
    pub fn external_context(&self) -> &Value {
        &self.external_context
    }

    /// Resolver over this context's namespaces.
    pub fn resolver(&self) -> VariableResolver<'_> {
        let resolver = VariableResolver::new(&self.external_context, &self.form_state);
        if self.handlers.is_empty() {
            resolver
        } else {
            resolver.with_handlers(&self.handlers)
        }
    }
}

/// Named callback run on every form-state change.
pub type ImperativeReaction = Arc<dyn Fn(&ReactionContext) -> anyhow::Result<()> + Send + Sync>;

/// Holds imperative reactions and queues declarative ones.
///
/// One engine per application instance; nothing here is process-global.
#[derive(Clone, Default)]
pub struct ReactionEngine {
    imperative: Vec<(String, ImperativeReaction)>,
}

impl fmt::Debug for ReactionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionEngine")
            .field("imperative", &self.names())
            .finish()
    }
}

impl ReactionEngine {
    /// An engine without imperative reactions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reaction` under `name`, replacing an earlier one in place.
    pub fn register(&mut self, name: impl Into<String>, reaction: ImperativeReaction) {
        let name = name.into();
        if let Some(slot) = self.imperative.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = reaction;
        } else {
            self.imperative.push((name, reaction));
        }
    }

    /// Remove the reaction registered under `name`; `false` when there was none.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.imperative.len();
        self.imperative.retain(|(n, _)| n != name);
        self.imperative.len() != before
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.imperative.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Run every imperative reaction. A failure is logged and does not stop the others.
    ///
    /// Returns the number of reactions that failed.
    #[tracing::instrument(level = "debug", skip_all, fields(count = self.imperative.len()))]
    pub fn run_imperative(&self, ctx: &ReactionContext) -> usize {
        let mut failed = 0;
        for (name, reaction) in &self.imperative {
            if let Err(err) = reaction(ctx) {
                failed += 1;
                tracing::warn!(
                    target: "formwright::reaction",
                    reaction = %name,
                    error = %err,
                    "imperative reaction failed"
                );
            }
        }
        failed
    }

    /// Queue one evaluation per entry of `node.reactions`, keyed by `field_key`.
    pub fn run_declarative(
        &self,
        field_key: &str,
        node: &SchemaNode,
        ctx: &ReactionContext,
        token: &CancellationToken,
    ) -> PendingReactions {
        let mut pending = PendingReactions::default();
        pending.queue(field_key, &node.reactions, ctx, token);
        pending
    }

    /// Queue the declarative reactions of every visible field of `schema`.
    pub fn collect_declarative(
        &self,
        schema: &SchemaNode,
        ctx: &ReactionContext,
        token: &CancellationToken,
    ) -> PendingReactions {
        self.collect_declarative_with(schema, &BuiltinCatalog, ctx, token)
    }

    /// [`ReactionEngine::collect_declarative`] with a custom classifier.
    ///
    /// Fields are keyed by their dotted name. Hidden fields are pruned from the render, so their
    /// reactions are not queued.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn collect_declarative_with<C>(
        &self,
        schema: &SchemaNode,
        classifier: &C,
        ctx: &ReactionContext,
        token: &CancellationToken,
    ) -> PendingReactions
    where
        C: ComponentClassifier + ?Sized,
    {
        let mut pending = PendingReactions::default();
        for field in extract_fields_with(schema, classifier) {
            if field.is_visible() && !field.reactions.is_empty() {
                pending.queue(&field.path, &field.reactions, ctx, token);
            }
        }
        pending
    }
}

struct PendingReaction {
    field_key: String,
    prop: String,
    expression: FormResult<Expression>,
    ctx: ReactionContext,
    token: CancellationToken,
}

/// Outcome counts of [`PendingReactions::settle`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Results handed to the callback.
    pub applied: usize,
    /// Entries dropped because their render pass was cancelled.
    pub cancelled: usize,
    /// Entries whose expression failed to parse or evaluate.
    pub failed: usize,
}

/// Declarative reactions waiting to be evaluated.
#[derive(Default)]
pub struct PendingReactions {
    entries: Vec<PendingReaction>,
}

impl fmt::Debug for PendingReactions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|e| format!("{}.{}", e.field_key, e.prop)),
            )
            .finish()
    }
}

impl PendingReactions {
    fn queue(
        &mut self,
        field_key: &str,
        reactions: &std::collections::BTreeMap<String, String>,
        ctx: &ReactionContext,
        token: &CancellationToken,
    ) {
        for (prop, src) in reactions {
            self.entries.push(PendingReaction {
                field_key: field_key.to_owned(),
                prop: prop.clone(),
                expression: Expression::parse(src),
                ctx: ctx.clone(),
                token: token.clone(),
            });
        }
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append another batch.
    pub fn extend(&mut self, other: PendingReactions) {
        self.entries.extend(other.entries);
    }

    /// Evaluate every live entry and pass `{prop: value}` to `set_field_props`.
    ///
    /// Undefined results are assigned as `null`. Entries whose token was cancelled are dropped
    /// without evaluation.
    #[tracing::instrument(level = "debug", skip_all, fields(count = self.entries.len()))]
    pub fn settle<F>(self, mut set_field_props: F) -> SettleReport
    where
        F: FnMut(&str, Map<String, Value>),
    {
        let mut report = SettleReport::default();
        for entry in self.entries {
            if entry.token.is_cancelled() {
                report.cancelled += 1;
                tracing::debug!(
                    target: "formwright::reaction",
                    field = %entry.field_key,
                    prop = %entry.prop,
                    "dropping reaction from a cancelled render pass"
                );
                continue;
            }

            let result = entry
                .expression
                .and_then(|expr| expr.evaluate(&entry.ctx.resolver()));
            match result {
                Ok(value) => {
                    let mut props = Map::new();
                    props.insert(entry.prop, value.unwrap_or(Value::Null));
                    set_field_props(&entry.field_key, props);
                    report.applied += 1;
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        target: "formwright::reaction",
                        field = %entry.field_key,
                        prop = %entry.prop,
                        error = %err,
                        "declarative reaction failed"
                    );
                }
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reaction/engine.rs"]
mod tests;
