use super::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn field(name: &str) -> Element {
    let spec = ComponentSpec::new("InputText", ComponentType::Field);
    let mut props = Props::new();
    props.insert("name", json!(name));
    TreeAdapter.create(&spec, props, vec![])
}

#[test]
fn create_records_spec_props_and_children() {
    let spec = ComponentSpec::new("Section", ComponentType::Container);
    let el = TreeAdapter.create(&spec, Props::new(), vec![field("a"), field("b")]);
    assert_eq!(el.component, "Section");
    assert_eq!(el.component_type, Some(ComponentType::Container));
    assert_eq!(el.child_components(), vec!["InputText", "InputText"]);
    assert_eq!(el.field_names(), vec!["a", "b"]);
    assert!(el.find_field("b").is_some());
}

#[test]
fn fragments_are_valid_and_typed_none() {
    let frag = TreeAdapter.fragment(vec![field("x")]);
    assert!(frag.is_fragment());
    assert!(TreeAdapter.is_valid_element(&frag));
    assert_eq!(TreeAdapter.get_children(&frag).len(), 1);
}

#[test]
fn set_props_spreads_over_existing() {
    let el = field("a");
    let patched = TreeAdapter.set_props(el, json!({"disabled": true}).as_object().unwrap());
    assert_eq!(patched.props["disabled"], json!(true));
    assert_eq!(patched.props["name"], json!("a"));
}

#[test]
fn submit_handler_survives_instantiation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let props = Props::new().with_on_submit(Arc::new(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    }));
    let spec = ComponentSpec::new("Form", ComponentType::FormContainer);
    let el = TreeAdapter.create(&spec, props, vec![]);
    assert!(el.submit(&json!({})));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!field("a").submit(&json!({})));
}

#[test]
fn serializes_without_handlers() {
    let el = field("a");
    let v = serde_json::to_value(&el).unwrap();
    assert_eq!(v["component"], json!("InputText"));
    assert_eq!(v["component_type"], json!("field"));
    assert!(v.get("children").is_none());
}
