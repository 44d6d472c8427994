use proptest::prelude::*;
use whitelabel_template::{
    render, render_with, Context, ParseErrorKind, ParseOptions, RenderOptions, Template,
    TemplateError,
};

fn items(values: &[String]) -> Vec<Context> {
    values
        .iter()
        .map(|v| Context::new().with("v", v.as_str()))
        .collect()
}

#[test]
fn test_hello_world() {
    let ctx = Context::new().with("name", "World");
    assert_eq!(render("Hello {{name}}!", &ctx).unwrap(), "Hello World!");
}

#[test]
fn test_unclosed_section_reports_tag() {
    let err = render("{{#a}}x", &Context::new()).unwrap_err();
    let TemplateError::Parse(parse) = err else {
        panic!("expected parse error, got {err}");
    };
    assert_eq!(parse.kind, ParseErrorKind::UnclosedSection("a".to_string()));
}

#[test]
fn test_missing_variable_policies() {
    let err = render("{{missing}}", &Context::new()).unwrap_err();
    assert!(matches!(err, TemplateError::MissingVariable { ref name, .. } if name == "missing"));

    let out = render_with(
        "{{missing}}",
        &Context::new(),
        ParseOptions::default(),
        &RenderOptions::permissive(),
    )
    .unwrap();
    assert_eq!(out, "");
}

#[test]
fn test_nested_sections_see_every_enclosing_scope() {
    let ctx = Context::from_json_str(
        r#"{
            "app": "demo",
            "flavors": [
                {"flavor": "free", "abis": [{"abi": "arm64"}, {"abi": "x86_64"}]},
                {"flavor": "paid", "abis": []}
            ]
        }"#,
    )
    .unwrap();
    let out = render(
        "{{#flavors}}{{flavor}}:{{#abis}}{{app}}-{{flavor}}-{{abi}};{{/abis}}|{{/flavors}}",
        &ctx,
    )
    .unwrap();
    assert_eq!(out, "free:demo-free-arm64;demo-free-x86_64;|paid:|");
}

#[test]
fn test_standalone_lines_produce_clean_blocks() {
    let source = "deps {\n    {{#dependencies}}\n    {{name}} '{{value}}'\n    {{/dependencies}}\n}\n";
    let ctx = Context::from_json_str(
        r#"{"dependencies": [
            {"name": "implementation", "value": "a:b:1"},
            {"name": "testImplementation", "value": "c:d:2"}
        ]}"#,
    )
    .unwrap();

    let template = Template::parse_with(source, ParseOptions::default().standalone_lines(true)).unwrap();
    assert_eq!(
        template.render(&ctx).unwrap(),
        "deps {\n    implementation 'a:b:1'\n    testImplementation 'c:d:2'\n}\n"
    );

    let literal = Template::parse(source).unwrap().render(&ctx).unwrap();
    assert_eq!(
        literal,
        "deps {\n    \n    implementation 'a:b:1'\n    \n    testImplementation 'c:d:2'\n    \n}\n"
    );
}

#[test]
fn test_rendering_does_not_mutate_inputs() {
    let template = Template::parse("{{#items}}{{v}}{{/items}}").unwrap();
    let ctx = Context::new().with("items", items(&["x".to_string()]));
    let (template_before, ctx_before) = (template.clone(), ctx.clone());
    template.render(&ctx).unwrap();
    assert_eq!(template, template_before);
    assert_eq!(ctx, ctx_before);
}

#[test]
fn test_shared_template_renders_concurrently() {
    let template = Template::parse("{{#items}}{{v}}{{/items}}").unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let template = &template;
                scope.spawn(move || {
                    let ctx = Context::new().with("items", items(&[i.to_string(), i.to_string()]));
                    template.render(&ctx).unwrap()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("{i}{i}"));
        }
    });
}

proptest! {
    #[test]
    fn test_text_without_directives_is_unchanged(text in "[a-zA-Z0-9 \n\t=(){}'\".,:-]{0,200}") {
        prop_assume!(!text.contains("{{"));
        prop_assert_eq!(render(&text, &Context::new()).unwrap(), text);
    }

    #[test]
    fn test_section_repeats_once_per_element(values in prop::collection::vec("[a-z0-9]{0,8}", 0..20)) {
        let ctx = Context::new().with("items", items(&values));
        let out = render("{{#items}}<{{v}}>{{/items}}", &ctx).unwrap();
        let expected: String = values.iter().map(|v| format!("<{v}>")).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn test_resolved_output_has_no_residual_tags(
        name in "[a-z ]{0,16}",
        values in prop::collection::vec("[a-z0-9 ]{0,8}", 0..5),
    ) {
        let ctx = Context::new().with("name", name).with("items", items(&values));
        let out = render("{ {{name}} }{{#items}}{ {{v}} }{{/items}}", &ctx).unwrap();
        prop_assert!(!out.contains("{{"));
        prop_assert!(!out.contains("}}"));
    }

    #[test]
    fn test_rendering_is_deterministic(values in prop::collection::vec("[a-z]{1,4}", 0..10)) {
        let template = Template::parse("{{#items}}{{v}}/{{/items}}").unwrap();
        let ctx = Context::new().with("items", items(&values));
        prop_assert_eq!(template.render(&ctx).unwrap(), template.render(&ctx).unwrap());
    }
}
