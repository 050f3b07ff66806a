use super::*;
use serde_json::json;

fn ctx<'a>(ext: &'a Value, form: &'a Value) -> MiddlewareContext<'a> {
    MiddlewareContext {
        external_context: ext,
        form_state: form,
        handlers: None,
        component_key: "field",
    }
}

fn props(v: Value) -> Props {
    Props::from(v.as_object().cloned().unwrap_or_default())
}

fn set(key: &'static str, value: Value) -> SharedMiddleware {
    named(
        format!("set-{key}"),
        move |p: &Props, _: &SchemaNode, _: &MiddlewareContext<'_>| {
            let mut next = p.clone();
            next.insert(key, value.clone());
            Ok(next)
        },
    )
}

fn failing() -> SharedMiddleware {
    named(
        "boom",
        |_: &Props, _: &SchemaNode, _: &MiddlewareContext<'_>| anyhow::bail!("boom"),
    )
}

#[test]
fn each_step_sees_accumulated_props() {
    let (ext, form) = (json!({}), json!({}));
    let double = named(
        "double",
        |p: &Props, _: &SchemaNode, _: &MiddlewareContext<'_>| {
            let n = p.get("n").and_then(Value::as_i64).unwrap_or(0);
            let mut next = p.clone();
            next.insert("n", json!(n * 2));
            Ok(next)
        },
    );
    let out = apply_all(
        props(json!({})),
        &SchemaNode::default(),
        &[set("n", json!(3)), double],
        &ctx(&ext, &form),
    );
    assert_eq!(out.fields["n"], json!(6));
}

#[test]
fn failing_middleware_is_transparent() {
    let (ext, form) = (json!({}), json!({}));
    let schema = SchemaNode::default();
    let input = props(json!({"a": 1}));

    let with_failure = apply_all(
        input.clone(),
        &schema,
        &[failing(), set("b", json!(2))],
        &ctx(&ext, &form),
    );
    let without = apply_all(input, &schema, &[set("b", json!(2))], &ctx(&ext, &form));
    assert_eq!(with_failure.fields, without.fields);
    assert_eq!(with_failure.fields, *json!({"a": 1, "b": 2}).as_object().unwrap());
}

#[test]
fn template_middleware_substitutes_props() {
    let ext = json!({"user": {"name": "Ada"}});
    let form = json!({"city": "NY"});
    let out = apply_all(
        props(json!({
            "ui": {"label": "{{ $externalContext.user.name }}"},
            "hint": "in {{ $formState.city }}",
            "n": 1
        })),
        &SchemaNode::default(),
        &[Arc::new(TemplateMiddleware)],
        &ctx(&ext, &form),
    );
    assert_eq!(out.fields["ui"]["label"], json!("Ada"));
    assert_eq!(out.fields["hint"], json!("in NY"));
    assert_eq!(out.fields["n"], json!(1));
}

#[test]
fn template_middleware_traversal_failure_is_contained() {
    let (ext, form) = (json!({}), json!({}));
    let input = props(json!({"label": "{{ $formState.a.b }}"}));
    let out = apply_all(
        input.clone(),
        &SchemaNode::default(),
        &[Arc::new(TemplateMiddleware)],
        &ctx(&ext, &form),
    );
    assert_eq!(out.fields, input.fields);
}

#[test]
fn template_middleware_keeps_submit_handler() {
    let (ext, form) = (json!({"x": 1}), json!({}));
    let input = props(json!({"label": "{{ $externalContext.x }}"}))
        .with_on_submit(Arc::new(|_: &Value| {}));
    let out = TemplateMiddleware
        .apply(&input, &SchemaNode::default(), &ctx(&ext, &form))
        .unwrap();
    assert!(out.on_submit.is_some());
    assert_eq!(out.fields["label"], json!("1"));
}

#[test]
fn registry_keeps_order_and_replaces_in_place() {
    let mut reg = MiddlewareRegistry::new();
    reg.register("a", set("a", json!(1)));
    reg.register("b", set("b", json!(2)));
    reg.register("a", set("a", json!(3)));
    assert_eq!(reg.names(), vec!["a", "b"]);

    let (ext, form) = (json!({}), json!({}));
    let out = apply_all(
        Props::new(),
        &SchemaNode::default(),
        &reg.ordered(),
        &ctx(&ext, &form),
    );
    assert_eq!(out.fields["a"], json!(3));

    assert!(reg.unregister("a"));
    assert!(!reg.unregister("a"));
    assert_eq!(reg.names(), vec!["b"]);
}
