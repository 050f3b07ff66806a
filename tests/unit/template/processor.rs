use super::*;
use crate::template::resolver::VariableResolver;
use serde_json::json;

fn ctx() -> (Value, Value) {
    (
        json!({"user": {"name": "Ada", "age": 36, "tags": ["x", "y"]}, "flag": true}),
        json!({"address": {"city": "NY"}}),
    )
}

#[test]
fn detect_finds_trimmed_inner_expressions() {
    assert_eq!(
        detect("Hi {{ $externalContext.user.name }} from {{$formState.address.city}}"),
        vec!["$externalContext.user.name", "$formState.address.city"]
    );
    assert!(detect("no markers here").is_empty());
    assert!(detect("{{}}").is_empty());
}

#[test]
fn strings_are_substituted_and_stringified() {
    let (ext, form) = ctx();
    let r = VariableResolver::new(&ext, &form);
    let v = json!("{{ $externalContext.user.name }} ({{ $externalContext.user.age }})");
    assert_eq!(process(&v, &r).unwrap().into_owned(), json!("Ada (36)"));

    let v = json!("{{ $externalContext.user.tags }}|{{ $externalContext.flag }}");
    assert_eq!(process(&v, &r).unwrap().into_owned(), json!("x,y|true"));

    let v = json!("{{ $externalContext.user }}");
    assert_eq!(process(&v, &r).unwrap().into_owned(), json!("[object Object]"));
}

#[test]
fn undefined_and_unknown_become_empty() {
    let (ext, form) = ctx();
    let r = VariableResolver::new(&ext, &form);
    let v = json!("[{{ $externalContext.missing }}][{{ nope }}]");
    assert_eq!(process(&v, &r).unwrap().into_owned(), json!("[][]"));
}

#[test]
fn marker_free_strings_are_identity() {
    let (ext, form) = ctx();
    let r = VariableResolver::new(&ext, &form);
    let v = json!("plain text");
    let out = process(&v, &r).unwrap();
    match out {
        Cow::Borrowed(b) => assert!(std::ptr::eq(b, &v)),
        Cow::Owned(_) => panic!("expected the input back"),
    }
}

#[test]
fn scalars_pass_through() {
    let (ext, form) = ctx();
    let r = VariableResolver::new(&ext, &form);
    for v in [json!(1), json!(true), Value::Null] {
        assert!(matches!(process(&v, &r).unwrap(), Cow::Borrowed(_)));
    }
}

#[test]
fn arrays_and_objects_are_rebuilt_recursively() {
    let (ext, form) = ctx();
    let r = VariableResolver::new(&ext, &form);
    let v = json!({
        "label": "{{ $externalContext.user.name }}",
        "nested": [{"city": "{{ $formState.address.city }}"}, 3, null],
        "keep": "as is"
    });
    let out = process(&v, &r).unwrap().into_owned();
    assert_eq!(
        out,
        json!({"label": "Ada", "nested": [{"city": "NY"}, 3, null], "keep": "as is"})
    );
}

#[test]
fn needs_processing_false_implies_deep_equal_output() {
    let (ext, form) = ctx();
    let r = VariableResolver::new(&ext, &form);
    let samples = [
        json!({"a": [1, "b", {"c": null}], "d": "{ not a marker }"}),
        json!(["x", ["y", ["z"]]]),
        json!("single { brace }"),
        json!(42.5),
    ];
    for v in samples {
        assert!(!needs_processing(&v));
        assert_eq!(process(&v, &r).unwrap().into_owned(), v);
    }
}

#[test]
fn needs_processing_finds_deep_markers() {
    assert!(needs_processing(&json!({"a": [{"b": "{{ x }}"}]})));
    assert!(!needs_processing(&json!({"a": [{"b": "x"}]})));
    for s in ["{{ a }}", "pre {{b}} post", "plain"] {
        assert_eq!(needs_processing(&json!(s)), !detect(s).is_empty());
    }
}

#[test]
fn traversal_failures_propagate() {
    let ext = json!({});
    let form = json!({});
    let r = VariableResolver::new(&ext, &form);
    let v = json!({"label": "{{ $formState.address.city }}"});
    assert!(process(&v, &r).unwrap_err().is_path_traversal());
}
