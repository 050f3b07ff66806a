use crate::foundation::error::FormResult;
use crate::foundation::value::get_path;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Namespace of the external context supplied by the provider.
pub const EXTERNAL_CONTEXT: &str = "$externalContext";
/// Namespace of the current form values.
pub const FORM_STATE: &str = "$formState";

/// Anything that can turn a template expression into a value.
///
/// `Ok(None)` means "undefined". Errors are reserved for unguarded path traversal.
pub trait ResolveVariable {
    /// Resolve one expression.
    fn resolve(&self, expression: &str) -> FormResult<Option<Value>>;
}

impl<F> ResolveVariable for F
where
    F: Fn(&str) -> FormResult<Option<Value>>,
{
    fn resolve(&self, expression: &str) -> FormResult<Option<Value>> {
        self(expression)
    }
}

/// Resolver for an extra namespace; receives the path after the prefix.
pub type NamespaceHandler = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// Extra namespaces, checked in insertion order before the built-in ones.
#[derive(Clone, Default)]
pub struct NamespaceHandlers {
    entries: Vec<(String, NamespaceHandler)>,
}

impl fmt::Debug for NamespaceHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(prefix, _)| prefix))
            .finish()
    }
}

impl NamespaceHandlers {
    /// No extra namespaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `prefix`; a later registration of the same prefix replaces it.
    pub fn insert(&mut self, prefix: impl Into<String>, handler: NamespaceHandler) {
        let prefix = prefix.into();
        self.entries.retain(|(p, _)| *p != prefix);
        self.entries.push((prefix, handler));
    }

    /// Builder form of [`NamespaceHandlers::insert`].
    pub fn with(mut self, prefix: impl Into<String>, handler: NamespaceHandler) -> Self {
        self.insert(prefix, handler);
        self
    }

    /// Whether no namespace is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, expression: &str) -> Option<Option<Value>> {
        self.entries.iter().find_map(|(prefix, handler)| {
            let rest = expression.strip_prefix(prefix.as_str())?;
            if !(rest.is_empty() || rest.starts_with(['.', ':'])) {
                return None;
            }
            Some(handler(rest.trim_start_matches(['.', ':'])))
        })
    }
}

/// Resolves `$externalContext[.path]` and `$formState[.path]` against borrowed state.
#[derive(Clone, Copy)]
pub struct VariableResolver<'a> {
    external_context: &'a Value,
    form_state: &'a Value,
    handlers: Option<&'a NamespaceHandlers>,
}

impl<'a> VariableResolver<'a> {
    /// A resolver over the two built-in namespaces.
    pub fn new(external_context: &'a Value, form_state: &'a Value) -> Self {
        Self {
            external_context,
            form_state,
            handlers: None,
        }
    }

    /// Consult `handlers` before the built-in namespaces.
    pub fn with_handlers(mut self, handlers: &'a NamespaceHandlers) -> Self {
        self.handlers = Some(handlers);
        self
    }
}

impl ResolveVariable for VariableResolver<'_> {
    fn resolve(&self, expression: &str) -> FormResult<Option<Value>> {
        let expression = expression.trim();

        if let Some(hit) = self.handlers.and_then(|h| h.lookup(expression)) {
            return Ok(hit);
        }
        if let Some(path) = namespace_path(expression, EXTERNAL_CONTEXT) {
            return get_path(self.external_context, path);
        }
        if let Some(path) = namespace_path(expression, FORM_STATE) {
            return get_path(self.form_state, path);
        }
        Ok(None)
    }
}

/// `Some(path)` when `expression` is `namespace` alone or `namespace.path`.
fn namespace_path<'e>(expression: &'e str, namespace: &str) -> Option<&'e str> {
    let rest = expression.strip_prefix(namespace)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('.')
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/resolver.rs"]
mod tests;
