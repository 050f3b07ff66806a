use super::*;
use crate::middleware::pipeline::{MiddlewareContext, named};
use crate::render::adapter::{Element, RuntimeAdapter, TreeAdapter};
use crate::render::props::Props;
use serde_json::json;

type Config = ProviderConfig<TreeAdapter>;

fn tag(name: &'static str) -> SharedMiddleware {
    named(
        name,
        |p: &Props, _: &SchemaNode, _: &MiddlewareContext<'_>| Ok(p.clone()),
    )
}

fn middleware_names(c: &Config) -> Vec<&str> {
    c.middlewares.iter().map(|m| m.name()).collect()
}

fn stub(_: &ComponentSpec, _: Props, adapter: &TreeAdapter, children: Vec<Element>) -> Element {
    adapter.fragment(children)
}

#[test]
fn components_are_right_biased() {
    let global = Config::new()
        .with_component(ComponentSpec::new("InputText", ComponentType::Field))
        .with_component(ComponentSpec::new("Card", ComponentType::Container));
    let local = Config::new().with_component(
        ComponentSpec::new("Card", ComponentType::Content).with_display_name("LocalCard"),
    );
    let merged = Config::merge(&global, &local);
    assert_eq!(merged.components.len(), 2);
    assert_eq!(merged.components["Card"].display_name, "LocalCard");
    assert_eq!(merged.components["Card"].component_type, ComponentType::Content);
}

#[test]
fn middlewares_concatenate_global_first() {
    let global = Config::new().with_middleware(tag("g1")).with_middleware(tag("g2"));
    let local = Config::new().with_middleware(tag("l1"));
    let merged = Config::merge(&global, &local);
    assert_eq!(middleware_names(&merged), vec!["g1", "g2", "l1"]);
}

#[test]
fn context_and_debug_shallow_merge_and_schema_prefers_local() {
    let g_schema = SchemaNode::from_value(json!({"component-name": "Form"})).unwrap();
    let l_schema = SchemaNode::from_value(json!({"component-name": "Section"})).unwrap();

    let global = Config::new()
        .with_external_context(json!({"user": {"name": "Ada"}, "locale": "en"}))
        .with_debug(DebugFlags::from_value(json!({"render": true})))
        .with_schema(g_schema.clone());
    let local = Config::new()
        .with_external_context(json!({"user": {"id": 7}}))
        .with_debug(DebugFlags::from_value(json!({"middleware": true, "render": false})));

    let merged = Config::merge(&global, &local);
    assert_eq!(
        merged.external_context_value(),
        json!({"user": {"id": 7}, "locale": "en"})
    );
    assert!(merged.debug.is_enabled("middleware"));
    assert!(!merged.debug.is_enabled("render"));
    assert_eq!(merged.schema.as_ref(), Some(&g_schema));

    let with_local_schema = Config::merge(&global, &Config::new().with_schema(l_schema.clone()));
    assert_eq!(with_local_schema.schema, Some(l_schema));
}

#[test]
fn renderers_are_right_biased_per_type() {
    let global = Config::new()
        .with_renderer(ComponentType::Field, Arc::new(stub))
        .with_renderer(ComponentType::Content, Arc::new(stub));
    let local = Config::new().with_renderer(ComponentType::Field, Arc::new(stub));
    let merged = Config::merge(&global, &local);
    assert_eq!(merged.renderers.len(), 2);
    assert!(Arc::ptr_eq(
        &merged.renderers[&ComponentType::Field],
        &local.renderers[&ComponentType::Field]
    ));
}

#[test]
fn merge_is_associative() {
    let a = Config::new()
        .with_middleware(tag("a"))
        .with_external_context(json!({"x": 1, "y": 1}))
        .with_component(ComponentSpec::new("A", ComponentType::Field));
    let b = Config::new()
        .with_middleware(tag("b"))
        .with_external_context(json!({"y": 2}))
        .with_component(ComponentSpec::new("A", ComponentType::Content));
    let c = Config::new()
        .with_middleware(tag("c"))
        .with_external_context(json!({"z": 3}));

    let left = Config::merge(&Config::merge(&a, &b), &c);
    let right = Config::merge(&a, &Config::merge(&b, &c));
    assert_eq!(middleware_names(&left), middleware_names(&right));
    assert_eq!(left.external_context, right.external_context);
    assert_eq!(
        left.components["A"].component_type,
        right.components["A"].component_type
    );
}

#[test]
fn debug_all_enables_every_category() {
    let mut flags = DebugFlags::default();
    assert!(!flags.is_enabled("render"));
    flags.set(DEBUG_ALL, true);
    assert!(flags.is_enabled("render"));
    assert!(flags.is_enabled("reaction"));
    assert!(!DebugFlags::from_value(json!(true)).is_enabled("render"));
}

#[test]
fn stack_folds_scopes_and_pops_back() {
    let mut stack = ProviderStack::new(
        Config::new()
            .with_external_context(json!({"theme": "light"}))
            .with_middleware(tag("root")),
    );
    stack.push(
        Config::new()
            .with_external_context(json!({"theme": "dark"}))
            .with_middleware(tag("inner")),
    );
    assert_eq!(stack.depth(), 2);
    let merged = stack.merged();
    assert_eq!(merged.external_context["theme"], json!("dark"));
    assert_eq!(middleware_names(&merged), vec!["root", "inner"]);

    assert!(stack.pop().is_some());
    let merged = stack.merged();
    assert_eq!(merged.external_context["theme"], json!("light"));
    assert_eq!(middleware_names(&merged), vec!["root"]);
}
