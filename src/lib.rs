//! Formwright renders declarative JSON form schemas through a pluggable runtime adapter.
//!
//! For every schema node the orchestrator decides which component to instantiate, which props
//! it receives and how it nests. The host framework only supplies a [`RuntimeAdapter`]:
//!
//! - Load a [`SchemaNode`] tree and describe the environment with a [`ProviderConfig`]
//! - Render one pass with an [`Orchestrator`], or keep a [`FormSession`] across passes
//! - Seed a [`FormStore`] from [`build_initial_values`]; field names match the rendered `name`
//!   props exactly
//! - Queue declarative [`ReactionEngine`] updates and [`PendingReactions::settle`] them
//!
//! `{{ $externalContext.path }}` and `{{ $formState.path }}` templates are substituted in schema
//! nodes and props before components are resolved.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod config;
pub(crate) mod expression;
pub(crate) mod form;
pub(crate) mod middleware;
pub(crate) mod reaction;
pub(crate) mod registry;
pub(crate) mod render;
pub(crate) mod schema;
pub(crate) mod template;

pub use crate::foundation::error::{FormError, FormResult};
pub use crate::foundation::value::{display_value, get_path, is_truthy, join_path, set_path};

pub use crate::config::provider::{DEBUG_ALL, DebugFlags, ProviderConfig, ProviderStack};
pub use crate::expression::Expression;
pub use crate::form::adapter::{FormAdapter, FormStore, WatchCallback, WatchId};
pub use crate::middleware::pipeline::{
    Middleware, MiddlewareContext, MiddlewareRegistry, NamedMiddleware, SharedMiddleware,
    TemplateMiddleware, apply_all, named,
};
pub use crate::reaction::engine::{
    ImperativeReaction, PendingReactions, ReactionContext, ReactionEngine, SettleReport,
};
pub use crate::registry::catalog;
pub use crate::registry::component::{
    ComponentFactory, ComponentMap, ComponentOverride, ComponentRegistry, ComponentSpec,
    ComponentType,
};
pub use crate::registry::renderer::{
    BuiltinRenderer, Renderer, RendererMap, RendererRegistry, RendererTable, SharedRenderer,
};
pub use crate::render::adapter::{Element, RuntimeAdapter, TreeAdapter};
pub use crate::render::orchestrator::{EXTERNAL_CONTEXT_PROP, Orchestrator};
pub use crate::render::props::{Props, SubmitHandler};
pub use crate::render::session::FormSession;
pub use crate::schema::fields::{
    BuiltinCatalog, ComponentClassifier, FieldDescriptor, FieldKind, TieredClassifier,
    build_initial_values, extract_fields, extract_fields_with, initial_values_for,
};
pub use crate::schema::naming::{NodePosition, ROOT_KEY, contributes_key, node_name};
pub use crate::schema::node::{SchemaNode, UiMeta};
pub use crate::template::processor::{
    detect, has_markers, needs_processing, process, process_map, process_str,
};
pub use crate::template::resolver::{
    EXTERNAL_CONTEXT, FORM_STATE, NamespaceHandler, NamespaceHandlers, ResolveVariable,
    VariableResolver,
};
pub use tokio_util::sync::CancellationToken;
