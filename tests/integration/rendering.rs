//! End-to-end rendering through the public library API.

use lessonforge::config::GlobalConfig;
use lessonforge::templating::{
    BlockKind, Context, DEFAULT_MAX_DEPTH, ParseError, ParseOptions, RenderLimits,
    TemplateRenderer, Value, evaluate, parse, parse_with_options, render,
};
use lessonforge::test_utils::init_test_logging;
use serial_test::serial;
use std::time::Instant;

#[test]
fn test_missing_variable_renders_blank() {
    assert_eq!(render("Hello {{name}}!", &Context::new()).unwrap(), "Hello !");
}

#[test]
fn test_conditional_gating() {
    let template = "{{#if show}}X{{/if}}";

    assert_eq!(render(template, &Context::new().with("show", true)).unwrap(), "X");
    assert_eq!(render(template, &Context::new().with("show", false)).unwrap(), "");
    assert_eq!(render(template, &Context::new()).unwrap(), "");
}

#[test]
fn test_falsy_values_gate_conditionals() {
    let template = "{{#if v}}shown{{/if}}";
    for value in [Value::Null, Value::Bool(false), Value::Number(0.0), Value::from("")] {
        let context = Context::new().with("v", value.clone());
        assert_eq!(render(template, &context).unwrap(), "", "{value:?} should be falsy");
    }
    for value in [Value::Number(-1.0), Value::from("no"), Value::List(Vec::new())] {
        let context = Context::new().with("v", value.clone());
        assert_eq!(render(template, &context).unwrap(), "shown", "{value:?} should be truthy");
    }
}

#[test]
fn test_iteration_with_one_based_index() {
    let context = Context::new().with("items", vec!["a", "b"]);
    let out = render("{{#each items}}{{@index}}:{{this}} {{/each}}", &context).unwrap();
    assert_eq!(out, "1:a 2:b ");
}

#[test]
fn test_non_list_iteration_source_renders_nothing() {
    let template = "{{#each n}}Y{{/each}}";
    assert_eq!(render(template, &Context::new().with("n", 5)).unwrap(), "");
    assert_eq!(render(template, &Context::new().with("n", "abc")).unwrap(), "");
    assert_eq!(render(template, &Context::new()).unwrap(), "");
}

#[test]
fn test_nested_iteration_restores_outer_scope() {
    let context = Context::new().with("outer", vec!["a", "b"]).with("inner", vec!["x", "y"]);

    let out = render(
        "{{#each outer}}[{{this}}:{{#each inner}}{{this}}{{/each}}:{{this}}]{{/each}}",
        &context,
    )
    .unwrap();
    assert_eq!(out, "[a:xy:a][b:xy:b]");

    let out = render(
        "{{#each outer}}{{@index}}{{#each inner}}{{@index}}{{/each}}{{@index}} {{/each}}",
        &context,
    )
    .unwrap();
    assert_eq!(out, "1121 2122 ");
}

#[test]
fn test_conditional_inside_iteration_and_back() {
    let context = Context::new()
        .with("show", true)
        .with("steps", vec!["mix", "bake"])
        .with("hidden", false);

    let out = render(
        "{{#if show}}{{#each steps}}{{#if hidden}}?{{/if}}{{@index}}) {{this}}\n{{/each}}{{/if}}",
        &context,
    )
    .unwrap();
    assert_eq!(out, "1) mix\n2) bake\n");
}

#[test]
fn test_this_outside_iteration_reads_context() {
    let context = Context::new().with("this", "top");
    assert_eq!(render("[{{this}}]", &context).unwrap(), "[top]");
    assert_eq!(render("[{{@index}}]", &Context::new()).unwrap(), "[]");
}

#[test]
fn test_literal_text_is_verbatim() {
    let template = "  leading spaces\n\ttabs and trailing  \n\n";
    assert_eq!(render(template, &Context::new()).unwrap(), template);
}

#[test]
fn test_malformed_markers_stay_literal() {
    let context = Context::new().with("name", "Ada");
    let template = "{{ name }} {{not a marker}} {{#unless x}} {{name";
    assert_eq!(render(template, &context).unwrap(), template);
}

#[test]
fn test_only_exact_markers_are_recognized() {
    let context = Context::new().with("name", "Ada").with("flag", true);

    assert_eq!(render("{{name}}|{{ name }}", &context).unwrap(), "Ada|{{ name }}");
    assert_eq!(
        render("{{#if  flag}}x{{#if flag}}y{{/if}}{{/ if}}", &context).unwrap(),
        "{{#if  flag}}xy{{/ if}}"
    );
    assert!(render("{{#if flag}}never closed{{/if }}", &context).is_err());
}

#[test]
fn test_value_text_forms() {
    let context = Context::new()
        .with("whole", 45)
        .with("fraction", 2.5)
        .with("flag", true)
        .with("list", vec!["soil", "water"]);
    let out = render("{{whole}} {{fraction}} {{flag}} {{list}}", &context).unwrap();
    assert_eq!(out, "45 2.5 true soil,water");
}

#[test]
fn test_unclosed_block_is_fatal() {
    match parse("{{#if x}}no close") {
        Err(ParseError::UnclosedBlock {
            kind,
            name,
            ..
        }) => {
            assert_eq!(kind, BlockKind::If);
            assert_eq!(name, "x");
        }
        other => panic!("expected UnclosedBlock, got {other:?}"),
    }
}

#[test]
fn test_unmatched_close_is_fatal() {
    let err = parse("{{/each}}").unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnmatchedClose {
            kind: BlockKind::Each,
            open: None,
            ..
        }
    ));
    assert_eq!(err.position().line, 1);
    assert_eq!(err.position().column, 1);
}

#[test]
fn test_mismatched_close_reports_open_block() {
    let err = parse("{{#if a}}\n  {{/each}}").unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnmatchedClose {
            kind: BlockKind::Each,
            open: Some(BlockKind::If),
            ..
        }
    ));
    assert_eq!(err.position().line, 2);
    assert_eq!(err.position().column, 3);
}

#[test]
fn test_parse_errors_abort_render() {
    let context = Context::new().with("x", true);
    assert!(render("before {{#if x}} after", &context).is_err());
    assert!(render("before {{/if}} after", &context).is_err());
}

#[test]
fn test_parse_then_evaluate_matches_render() {
    let template = "{{#each items}}{{@index}}. {{this}}\n{{/each}}";
    let context = Context::new().with("items", vec!["one", "two"]);

    let ast = parse(template).unwrap();
    assert_eq!(ast, parse(template).unwrap());
    assert_eq!(evaluate(&ast, &context), render(template, &context).unwrap());
    assert_eq!(evaluate(&ast, &context), evaluate(&ast, &context));
}

#[test]
fn test_depth_limit() {
    let template = "{{#if a}}{{#if b}}{{#if c}}deep{{/if}}{{/if}}{{/if}}";

    assert!(parse_with_options(template, ParseOptions::with_max_depth(3)).is_ok());
    let err = parse_with_options(template, ParseOptions::with_max_depth(2)).unwrap_err();
    assert!(matches!(
        err,
        ParseError::DepthLimitExceeded {
            limit: 2,
            ..
        }
    ));
}

#[test]
fn test_deep_nesting_is_rejected_without_configuration() {
    let depth = 50_000;
    let template = format!("{}x{}", "{{#each a}}".repeat(depth), "{{/each}}".repeat(depth));
    let context = Context::new().with("a", vec!["1"]);

    let err = render(&template, &context).unwrap_err();
    assert!(matches!(
        err,
        ParseError::DepthLimitExceeded {
            limit: DEFAULT_MAX_DEPTH,
            ..
        }
    ));
    assert!(TemplateRenderer::new().render_template(&template, &context).is_err());

    let within = format!(
        "{}x{}",
        "{{#each a}}".repeat(DEFAULT_MAX_DEPTH),
        "{{/each}}".repeat(DEFAULT_MAX_DEPTH)
    );
    assert_eq!(render(&within, &context).unwrap(), "x");
}

#[test]
fn test_renderer_iteration_budget_truncates() {
    let renderer = TemplateRenderer::new().with_limits(RenderLimits {
        max_iterations: Some(2),
    });
    let context = Context::new().with("items", vec!["a", "b", "c", "d"]);

    let out = renderer.render_template("{{#each items}}{{this}}{{/each}}!", &context).unwrap();
    assert_eq!(out, "ab!");
}

#[test]
fn test_renderer_from_config_caches_parses() {
    let renderer = TemplateRenderer::from_config(&GlobalConfig::default());
    let context = Context::new().with("name", "Ada");

    for _ in 0..3 {
        assert_eq!(renderer.render_template("Hi {{name}}", &context).unwrap(), "Hi Ada");
    }

    let stats = renderer.cache_stats().expect("cache enabled by default");
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
}

#[test]
fn test_context_from_json() {
    let context =
        Context::from_json_str(r#"{"topic": "Soil", "steps": ["dig", "sift"], "lab": true}"#)
            .unwrap();
    let out = render("{{topic}}:{{#each steps}} {{this}}{{/each}}{{#if lab}}!{{/if}}", &context)
        .unwrap();
    assert_eq!(out, "Soil: dig sift!");

    assert!(Context::from_json_str(r#"{"nested": {"a": 1}}"#).is_err());
    assert!(Context::from_json_str("[1, 2]").is_err());
}

/// Timing-sensitive, so it does not share the CPU with other tests.
#[test]
#[serial]
fn test_parse_cache_on_large_template() {
    init_test_logging(None);

    let mut template = String::new();
    for i in 0..500 {
        template.push_str(&format!(
            "Section {i}: {{{{title}}}}\n{{{{#if show}}}}{{{{#each items}}}}- {{{{this}}}}\n{{{{/each}}}}{{{{/if}}}}\n"
        ));
    }
    let context = Context::new().with("title", "T").with("show", true).with("items", vec!["a", "b"]);

    let uncached = TemplateRenderer::new().with_cache(false);
    let cached = TemplateRenderer::new().with_cache(true);

    let start = Instant::now();
    let expected = uncached.render_template(&template, &context).unwrap();
    tracing::debug!("uncached render took {:?}", start.elapsed());

    let start = Instant::now();
    for _ in 0..50 {
        assert_eq!(cached.render_template(&template, &context).unwrap(), expected);
    }
    tracing::debug!("50 cached renders took {:?}", start.elapsed());

    let stats = cached.cache_stats().unwrap();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 49);
    assert!(uncached.cache_stats().is_none());
    assert!(expected.contains("Section 499: T\n- a\n- b\n"));
}
