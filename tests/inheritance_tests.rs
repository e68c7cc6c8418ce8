//! Integration tests for blocks and parent templates

use mustachio::{Library, Template, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

fn library(templates: &[(&str, &str)]) -> Library {
    let mut library = Library::new();
    for (name, source) in templates {
        library.register_source(*name, source).expect("Should parse");
    }
    library
}

fn data(value: serde_json::Value) -> Value {
    Value::from_json_str(&value.to_string()).expect("Should decode")
}

#[test]
fn test_block_renders_default_without_parent() {
    let template = Template::new("<{{$title}}Default{{/title}}>").unwrap();
    assert_eq!(template.render(&Value::Null), "<Default>");
}

#[test]
fn test_block_default_can_use_data() {
    let template = Template::new("{{$greeting}}Hi {{name}}{{/greeting}}").unwrap();
    assert_eq!(template.render(&data(json!({"name": "Sam"}))), "Hi Sam");
}

#[test]
fn test_parent_overrides_block() {
    let library = library(&[
        ("base", "<h1>{{$title}}Base{{/title}}</h1>{{$footer}}(c){{/footer}}"),
        ("page", "{{<base}}{{$title}}Page{{/title}}{{/base}}"),
    ]);
    assert_eq!(
        library.render("page", &Value::Null).unwrap(),
        "<h1>Page</h1>(c)"
    );
}

#[test]
fn test_grandchild_override_wins() {
    let library = library(&[
        ("base", "<h1>{{$title}}Base{{/title}}</h1>"),
        ("child", "{{<base}}{{$title}}Child{{/title}}{{/base}}"),
        ("grandchild", "{{<child}}{{$title}}Grandchild{{/title}}{{/child}}"),
    ]);
    assert_eq!(library.render("child", &Value::Null).unwrap(), "<h1>Child</h1>");
    assert_eq!(
        library.render("grandchild", &Value::Null).unwrap(),
        "<h1>Grandchild</h1>"
    );
}

#[test]
fn test_intermediate_override_used_when_outer_is_silent() {
    let library = library(&[
        ("base", "{{$a}}A{{/a}}{{$b}}B{{/b}}"),
        ("child", "{{<base}}{{$b}}child-b{{/b}}{{/base}}"),
        ("grandchild", "{{<child}}{{$a}}gc-a{{/a}}{{/child}}"),
    ]);
    assert_eq!(
        library.render("grandchild", &Value::Null).unwrap(),
        "gc-achild-b"
    );
}

#[test]
fn test_override_renders_with_current_context() {
    let library = library(&[
        ("list", "{{#items}}[{{$item}}{{.}}{{/item}}]{{/items}}"),
        ("fancy", "{{<list}}{{$item}}*{{.}}*{{/item}}{{/list}}"),
    ]);
    let data = data(json!({"items": ["a", "b"]}));
    assert_eq!(library.render("list", &data).unwrap(), "[a][b]");
    assert_eq!(library.render("fancy", &data).unwrap(), "[*a*][*b*]");
}

#[test]
fn test_standalone_parent_and_blocks() {
    let library = library(&[
        (
            "layout",
            "<html>\n  {{$body}}\n  <p>empty</p>\n  {{/body}}\n</html>\n",
        ),
        (
            "page",
            "{{<layout}}\n{{$body}}\n<p>one</p>\n<p>two</p>\n{{/body}}\n{{/layout}}\n",
        ),
    ]);
    assert_eq!(
        library.render("layout", &Value::Null).unwrap(),
        "<html>\n  <p>empty</p>\n</html>\n"
    );
    assert_eq!(
        library.render("page", &Value::Null).unwrap(),
        "<html>\n  <p>one</p>\n  <p>two</p>\n</html>\n"
    );
}

#[test]
fn test_parent_inside_section() {
    let library = library(&[
        ("card", "({{$content}}none{{/content}})"),
        (
            "cards",
            "{{#people}}{{<card}}{{$content}}{{name}}{{/content}}{{/card}}{{/people}}",
        ),
    ]);
    let data = data(json!({"people": [{"name": "Ann"}, {"name": "Bo"}]}));
    assert_eq!(library.render("cards", &data).unwrap(), "(Ann)(Bo)");
}

#[test]
fn test_dynamic_parent() {
    let library = library(&[
        ("narrow", "|{{$x}}?{{/x}}|"),
        ("wide", "| {{$x}}?{{/x}} |"),
        ("page", "{{<*layout}}{{$x}}!{{/x}}{{/*layout}}"),
    ]);
    assert_eq!(
        library.render("page", &data(json!({"layout": "wide"}))).unwrap(),
        "| ! |"
    );
    assert_eq!(
        library.render("page", &data(json!({"layout": "narrow"}))).unwrap(),
        "|!|"
    );
    assert_eq!(library.render("page", &data(json!({}))).unwrap(), "");
}

#[test]
fn test_unknown_parent_renders_nothing() {
    let library = library(&[("page", "a{{<missing}}{{$x}}y{{/x}}{{/missing}}b")]);
    assert_eq!(library.render("page", &Value::Null).unwrap(), "ab");
}

#[test]
fn test_overrides_reach_nested_partials() {
    let library = library(&[
        ("header", "<{{$title}}Untitled{{/title}}>"),
        ("base", "{{>header}}{{$body}}{{/body}}"),
        ("page", "{{<base}}{{$title}}Home{{/title}}{{$body}}text{{/body}}{{/base}}"),
    ]);
    insta::assert_snapshot!(library.render("page", &Value::Null).unwrap(), @"<Home>text");
}

#[test]
fn test_standalone_parent_indents_like_partial() {
    let library = library(&[
        ("parent", "one\ntwo\n"),
        ("partial", "Hi,\n  {{>parent}}\nend\n"),
        ("multi_line", "Hi,\n  {{<parent}}\n  {{/parent}}\nend\n"),
        ("one_line", "Hi,\n  {{<parent}}{{/parent}}\nend\n"),
    ]);
    let expected = "Hi,\n  one\n  two\nend\n";
    assert_eq!(library.render("partial", &Value::Null).unwrap(), expected);
    assert_eq!(library.render("multi_line", &Value::Null).unwrap(), expected);
    assert_eq!(library.render("one_line", &Value::Null).unwrap(), expected);
}

#[test]
fn test_missing_standalone_parent_leaves_no_indentation() {
    let library = library(&[("page", "a\n  {{<missing}}\n  {{/missing}}\nb\n")]);
    assert_eq!(library.render("page", &Value::Null).unwrap(), "a\nb\n");
}
