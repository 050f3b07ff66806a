use super::*;
use serde_json::json;

#[test]
fn resolves_both_namespaces() {
    let ext = json!({"user": {"name": "Ada"}});
    let form = json!({"address": {"city": "NY"}});
    let r = VariableResolver::new(&ext, &form);

    assert_eq!(r.resolve("$externalContext.user.name").unwrap(), Some(json!("Ada")));
    assert_eq!(r.resolve(" $formState.address.city ").unwrap(), Some(json!("NY")));
}

#[test]
fn bare_namespace_returns_whole_object() {
    let ext = json!({"a": 1});
    let form = json!({"b": 2});
    let r = VariableResolver::new(&ext, &form);
    assert_eq!(r.resolve("$externalContext").unwrap(), Some(ext.clone()));
    assert_eq!(r.resolve("$formState").unwrap(), Some(form.clone()));
}

#[test]
fn unknown_prefixes_are_undefined() {
    let ext = json!({});
    let form = json!({});
    let r = VariableResolver::new(&ext, &form);
    assert_eq!(r.resolve("$other.x").unwrap(), None);
    assert_eq!(r.resolve("plain").unwrap(), None);
    assert_eq!(r.resolve("$formStateX").unwrap(), None);
}

#[test]
fn nested_path_through_missing_intermediate_raises() {
    let ext = json!({});
    let form = json!({});
    let r = VariableResolver::new(&ext, &form);
    let err = r.resolve("$formState.address.city").unwrap_err();
    assert!(err.is_path_traversal());
}

#[test]
fn missing_leaf_under_present_parent_is_undefined() {
    let ext = json!({});
    let form = json!({"address": {}});
    let r = VariableResolver::new(&ext, &form);
    assert_eq!(r.resolve("$formState.address.city").unwrap(), None);
}

#[test]
fn custom_handlers_win_and_get_stripped_rest() {
    let ext = json!({"x": "from-context"});
    let form = json!({});
    let handlers = NamespaceHandlers::new()
        .with(
            "$env",
            Arc::new(|rest: &str| Some(json!(format!("env:{rest}")))),
        )
        .with(
            "$externalContext",
            Arc::new(|_: &str| Some(json!("shadowed"))),
        );
    let r = VariableResolver::new(&ext, &form).with_handlers(&handlers);

    assert_eq!(r.resolve("$env.HOME").unwrap(), Some(json!("env:HOME")));
    assert_eq!(r.resolve("$env:PATH").unwrap(), Some(json!("env:PATH")));
    assert_eq!(r.resolve("$externalContext.x").unwrap(), Some(json!("shadowed")));
}

#[test]
fn custom_prefixes_match_whole_namespace_names() {
    let ext = json!({});
    let form = json!({});
    let handlers = NamespaceHandlers::new().with(
        "$env",
        Arc::new(|rest: &str| Some(json!(format!("env:{rest}")))),
    );
    let r = VariableResolver::new(&ext, &form).with_handlers(&handlers);

    assert_eq!(r.resolve("$env").unwrap(), Some(json!("env:")));
    assert_eq!(r.resolve("$environment.x").unwrap(), None);
}

#[test]
fn closures_are_resolvers() {
    let r = |expr: &str| -> FormResult<Option<Value>> { Ok(Some(json!(expr.len()))) };
    assert_eq!(r.resolve("abc").unwrap(), Some(json!(3)));
}
