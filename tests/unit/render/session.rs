use super::*;
use crate::config::provider::ProviderConfig;
use crate::form::adapter::FormAdapter;
use crate::registry::component::{ComponentOverride, ComponentSpec, ComponentType};
use crate::render::adapter::{Element, TreeAdapter};
use serde_json::{Map, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn profile() -> SchemaNode {
    SchemaNode::from_value(json!({
        "component-name": "Form",
        "properties": {
            "personal": {
                "component-name": "Section",
                "properties": {
                    "ageWrapper": {
                        "component-name": "FieldWrapper",
                        "ui": {"label": "Age"},
                        "properties": {
                            "age": {
                                "component-name": "InputNumber",
                                "reactions": {"disabled": "$formState.personal.locked === true"}
                            }
                        }
                    },
                    "rating": {"component-name": "StarRating"}
                }
            }
        }
    }))
    .unwrap()
}

fn session() -> FormSession<TreeAdapter> {
    FormSession::new(
        TreeAdapter,
        ProviderConfig::new()
            .with_schema(profile())
            .with_component(ComponentSpec::new("StarRating", ComponentType::Field)),
    )
}

#[test]
fn fields_and_render_agree_on_names() {
    let mut s = session();
    let values = s.initial_values().unwrap();
    assert_eq!(values, json!({"personal": {"age": null, "rating": ""}}));

    let tree: Element = s.render(&values).unwrap().unwrap();
    assert_eq!(tree.field_names(), vec!["personal.age", "personal.rating"]);
    let store = s.form_store().unwrap();
    assert_eq!(store.get_values(), values);
}

#[test]
fn missing_schema_is_a_validation_error() {
    let mut s = FormSession::new(TreeAdapter, ProviderConfig::<TreeAdapter>::new());
    let err = s.render(&json!({})).unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
    assert!(s.fields().is_err());
}

#[test]
fn new_pass_cancels_pending_reactions_of_the_previous_one() {
    let mut s = session();
    let state = json!({"personal": {"locked": true}});
    s.render(&state).unwrap();
    let stale = s.react(&state).unwrap();
    assert_eq!(stale.len(), 1);

    s.render(&state).unwrap();
    assert_eq!(s.passes(), 2);
    let fresh = s.react(&state).unwrap();

    let mut applied = Vec::new();
    let report = stale.settle(|key, props| applied.push((key.to_owned(), props)));
    assert_eq!(report.cancelled, 1);
    assert!(applied.is_empty());

    let report = fresh.settle(|key, props| applied.push((key.to_owned(), props)));
    assert_eq!(report.applied, 1);
    let mut expected = Map::new();
    expected.insert("disabled".to_owned(), json!(true));
    assert_eq!(applied, vec![("personal.age".to_owned(), expected)]);
}

#[test]
fn close_cancels_everything() {
    let s = session();
    let pending = s.react(&json!({"personal": {}})).unwrap();
    s.close();
    assert!(s.pass_token().is_cancelled());
    assert_eq!(pending.settle(|_, _| {}).cancelled, 1);
}

#[test]
fn react_runs_imperative_reactions_with_external_context() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let mut s = FormSession::new(
        TreeAdapter,
        ProviderConfig::new()
            .with_schema(profile())
            .with_external_context(json!({"tenant": "acme"})),
    );
    s.reactions_mut().register(
        "audit",
        Arc::new(move |ctx: &ReactionContext| -> anyhow::Result<()> {
            assert_eq!(ctx.external_context()["tenant"], json!("acme"));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );
    s.react(&json!({"personal": {}})).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn overrides_and_nested_scopes_apply_to_the_next_pass() {
    let mut s = session();
    assert!(s.components_mut().register_override(
        "Section",
        &ComponentOverride {
            display_name: Some("Panel".to_owned()),
            ..ComponentOverride::default()
        },
    ));
    s.scopes_mut()
        .push(ProviderConfig::new().with_external_context(json!({"theme": "dark"})));

    let tree = s.render(&json!({"personal": {}})).unwrap().unwrap();
    let section = tree.find("Section").unwrap();
    assert_eq!(section.props["externalContext"]["theme"], json!("dark"));

    s.scopes_mut().pop();
    let tree = s.render(&json!({"personal": {}})).unwrap().unwrap();
    assert!(
        tree.find("Section").unwrap().props["externalContext"]
            .get("theme")
            .is_none()
    );
}

#[test]
fn templated_components_are_classified_and_keep_raw_reactions() {
    let schema = SchemaNode::from_value(json!({
        "component-name": "Form",
        "properties": {
            "email": {
                "component-name": "{{ $externalContext.kind }}",
                "reactions": {"required": "{{ $formState.plan === 'pro' }}"}
            }
        }
    }))
    .unwrap();
    let mut s = FormSession::new(
        TreeAdapter,
        ProviderConfig::new()
            .with_schema(schema)
            .with_external_context(json!({"kind": "InputText"})),
    );

    let fields = s.fields().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].path, "email");
    assert_eq!(fields[0].component, "InputText");
    assert_eq!(s.initial_values().unwrap(), json!({"email": ""}));

    let tree = s.render(&json!({"email": ""})).unwrap().unwrap();
    assert_eq!(tree.field_names(), vec!["email"]);

    let pending = s.react(&json!({"plan": "pro"})).unwrap();
    let mut applied = Vec::new();
    let report = pending.settle(|key, props| applied.push((key.to_owned(), props)));
    assert_eq!(report.applied, 1);
    assert_eq!(applied[0].0, "email");
    assert_eq!(applied[0].1["required"], json!(true));
}
