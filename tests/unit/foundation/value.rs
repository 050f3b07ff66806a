use super::*;
use serde_json::json;

#[test]
fn get_path_reads_nested_values() {
    let root = json!({"address": {"city": "NY"}, "tags": ["a", "b"]});
    assert_eq!(get_path(&root, "address.city").unwrap(), Some(json!("NY")));
    assert_eq!(get_path(&root, "tags.1").unwrap(), Some(json!("b")));
    assert_eq!(get_path(&root, "tags.length").unwrap(), Some(json!(2)));
    assert_eq!(get_path(&root, "").unwrap(), Some(root.clone()));
}

#[test]
fn get_path_missing_leaf_is_undefined() {
    let root = json!({"address": {}});
    assert_eq!(get_path(&root, "address.city").unwrap(), None);
    assert_eq!(get_path(&root, "missing").unwrap(), None);
}

#[test]
fn get_path_through_missing_intermediate_fails() {
    let root = json!({});
    let err = get_path(&root, "address.city").unwrap_err();
    assert!(err.is_path_traversal());
    assert!(err.to_string().contains("'city'"));

    let root = json!({"address": null});
    assert!(get_path(&root, "address.city").unwrap_err().is_path_traversal());
}

#[test]
fn set_path_creates_intermediates() {
    let mut root = json!({});
    set_path(&mut root, "personal.name", json!(""));
    set_path(&mut root, "personal.age", Value::Null);
    set_path(&mut root, "agree", json!(false));
    assert_eq!(
        root,
        json!({"personal": {"name": "", "age": null}, "agree": false})
    );
}

#[test]
fn set_path_replaces_scalar_intermediates() {
    let mut root = json!({"a": 1});
    set_path(&mut root, "a.b", json!(true));
    assert_eq!(root, json!({"a": {"b": true}}));
}

#[test]
fn display_value_follows_js_string_rules() {
    assert_eq!(display_value(None), "");
    assert_eq!(display_value(Some(&Value::Null)), "");
    assert_eq!(display_value(Some(&json!(true))), "true");
    assert_eq!(display_value(Some(&json!(3.0))), "3");
    assert_eq!(display_value(Some(&json!(2.5))), "2.5");
    assert_eq!(display_value(Some(&json!(["a", null, 1]))), "a,,1");
    assert_eq!(display_value(Some(&json!({"k": 1}))), "[object Object]");
}

#[test]
fn truthiness() {
    assert!(!is_truthy(None));
    assert!(!is_truthy(Some(&json!(0))));
    assert!(!is_truthy(Some(&json!(""))));
    assert!(is_truthy(Some(&json!("x"))));
    assert!(is_truthy(Some(&json!([]))));
}

#[test]
fn join_path_treats_empty_parent_as_root() {
    assert_eq!(join_path(None, "a"), "a");
    assert_eq!(join_path(Some(""), "a"), "a");
    assert_eq!(join_path(Some("s"), "a"), "s.a");
}
