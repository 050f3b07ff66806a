use super::*;
use serde_json::json;

#[test]
fn parses_non_standard_keys_and_keeps_extras() {
    let node = SchemaNode::from_value(json!({
        "component-name": "InputText",
        "type": "string",
        "title": "Name",
        "ui": {"order": 2, "label": "Name", "visible": true},
        "component-props": {"maxLength": 10},
        "rules": ["required"],
        "reactions": {"disabled": "$formState.locked"}
    }))
    .unwrap();

    assert_eq!(node.component_name.as_deref(), Some("InputText"));
    assert_eq!(node.ui.order(), Some(2.0));
    assert_eq!(node.ui.visible(), Some(true));
    assert_eq!(node.ui.get("label"), Some(&json!("Name")));
    assert_eq!(node.component_props.get("maxLength"), Some(&json!(10)));
    assert_eq!(node.rules, vec!["required".to_string()]);
    assert_eq!(node.extra.get("type"), Some(&json!("string")));

    let back = node.to_value().unwrap();
    assert_eq!(back["title"], json!("Name"));
    assert_eq!(back["ui"]["label"], json!("Name"));
}

#[test]
fn order_and_visible_accept_string_forms() {
    let node = SchemaNode::from_value(json!({
        "ui": {"order": " 3 ", "visible": "false"}
    }))
    .unwrap();
    assert_eq!(node.ui.order(), Some(3.0));
    assert!(!node.ui.is_visible());

    let node = SchemaNode::from_value(json!({"ui": {"order": "", "visible": ""}})).unwrap();
    assert_eq!(node.ui.order(), None);
    assert!(node.ui.is_visible());
}

#[test]
fn sorted_children_puts_missing_order_last() {
    let node = SchemaNode::from_value(json!({
        "properties": {
            "a": {"ui": {}},
            "b": {"ui": {"order": 2}},
            "c": {"ui": {"order": 1}}
        }
    }))
    .unwrap();
    let keys: Vec<&str> = node.sorted_children().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["c", "b", "a"]);
}

#[test]
fn sorted_children_is_stable_for_ties() {
    let node = SchemaNode::from_value(json!({
        "properties": {
            "x": {"ui": {"order": 1}},
            "a": {"ui": {"order": 1}},
            "m": {}
        }
    }))
    .unwrap();
    let keys: Vec<&str> = node.sorted_children().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "x", "m"]);
}

#[test]
fn ui_overlay_prefers_own_fields() {
    let wrapper = UiMeta::from(
        json!({"order": 1, "visible": false, "label": "outer", "hint": "h"})
            .as_object()
            .cloned()
            .unwrap(),
    );
    let inner = UiMeta::from(
        json!({"visible": true, "label": "inner"})
            .as_object()
            .cloned()
            .unwrap(),
    );
    let merged = inner.or(&wrapper);
    assert_eq!(merged.order(), Some(1.0));
    assert_eq!(merged.visible(), Some(true));
    assert_eq!(merged.get("label"), Some(&json!("inner")));
    assert_eq!(merged.get("hint"), Some(&json!("h")));
}

#[test]
fn templated_ui_values_survive_until_substituted() {
    let node = SchemaNode::from_value(json!({
        "ui": {"visible": "{{ $formState.show }}", "order": "{{ $externalContext.pos }}"}
    }))
    .unwrap();
    assert!(node.ui.is_visible());
    assert_eq!(node.ui.order(), None);
    assert_eq!(
        node.to_value().unwrap()["ui"]["visible"],
        json!("{{ $formState.show }}")
    );
}

#[test]
fn from_json_str_reports_validation_errors() {
    let err = SchemaNode::from_json_str("{not json").unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}

#[test]
fn component_falls_back_to_key() {
    let node = SchemaNode::default();
    assert_eq!(node.component_or("Section"), "Section");
}
