//! Loading, input handling and validation of descriptor files.

use lessonforge::core::ForgeError;
use lessonforge::descriptor::{InputIssue, TemplateDescriptor, VariableType, validate_descriptor};
use lessonforge::templating::{Context, ParseOptions, TemplateRenderer, Value};
use lessonforge::test_utils::{DescriptorFixture, LESSON_TEMPLATE};
use tempfile::TempDir;

const RENDERED_LESSON: &str =
    "# Photosynthesis for Class 4B\nLab: bring goggles\n1. Observe\n2. Record\nDuration: 45 min\n";

fn lesson_inputs() -> Context {
    Context::new()
        .with("topic", "Photosynthesis")
        .with("includeLab", "yes")
        .with("steps", vec!["Observe", "Record"])
}

#[tokio::test]
async fn test_every_format_loads_the_same_lesson() {
    let temp = TempDir::new().unwrap();
    let fixtures = [
        DescriptorFixture::lesson_toml(),
        DescriptorFixture::lesson_yaml(),
        DescriptorFixture::lesson_json(),
        DescriptorFixture::lesson_markdown(),
    ];

    for fixture in fixtures {
        let path = fixture.write_to(temp.path()).unwrap();
        let descriptor = TemplateDescriptor::load(&path).await.unwrap();

        assert_eq!(descriptor.name.as_deref(), Some("Photosynthesis"), "{}", fixture.file_name);
        assert_eq!(descriptor.variables.len(), 4);
        assert_eq!(descriptor.template.trim(), LESSON_TEMPLATE.trim());

        let (context, issues) = descriptor.build_context(&lesson_inputs());
        assert!(issues.is_empty(), "{}: {issues:?}", fixture.file_name);

        let out = TemplateRenderer::new().render_template(&descriptor.template, &context).unwrap();
        assert_eq!(out.trim(), RENDERED_LESSON.trim(), "{}", fixture.file_name);
    }
}

#[tokio::test]
async fn test_descriptor_fields_deserialize() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::lesson_yaml().write_to(temp.path()).unwrap();
    let descriptor = TemplateDescriptor::load(&path).await.unwrap();

    let topic = descriptor.variable("topic").unwrap();
    assert!(topic.required);
    assert_eq!(topic.display_label(), "Topic");
    assert_eq!(descriptor.variable("minutes").unwrap().var_type, VariableType::Number);
    assert_eq!(descriptor.variable("minutes").unwrap().default_value, Some(Value::Number(45.0)));

    let lab = descriptor.conditional_section("lab").unwrap();
    assert_eq!(lab.condition, "includeLab");

    assert_eq!(
        descriptor.custom_prompts.get("objectives").map(String::as_str),
        Some("List three learning objectives")
    );
    assert_eq!(descriptor.metadata.author.as_deref(), Some("Science dept"));
    assert_eq!(descriptor.metadata.tags, vec!["biology", "plants"]);
}

#[tokio::test]
async fn test_missing_required_input_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::lesson_toml().write_to(temp.path()).unwrap();
    let descriptor = TemplateDescriptor::load(&path).await.unwrap();

    let (context, issues) = descriptor.build_context(&Context::new().with("topic", "   "));

    assert_eq!(issues.len(), 1);
    assert!(matches!(&issues[0], InputIssue::MissingRequired { name, .. } if name == "topic"));
    assert_eq!(context.get("includeLab"), Some(&Value::Bool(false)));
    assert_eq!(context.get("className"), Some(&Value::from("Class 4B")));

    let out = TemplateRenderer::new().render_template(&descriptor.template, &context).unwrap();
    assert!(out.contains(" for Class 4B\n"));
    assert!(!out.contains("Lab:"));
}

#[tokio::test]
async fn test_bad_number_input_keeps_value() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::lesson_json().write_to(temp.path()).unwrap();
    let descriptor = TemplateDescriptor::load(&path).await.unwrap();

    let inputs = lesson_inputs().with("minutes", "forty");
    let (context, issues) = descriptor.build_context(&inputs);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].name(), "minutes");
    assert_eq!(context.get("minutes"), Some(&Value::from("forty")));
}

#[tokio::test]
async fn test_missing_file_is_descriptor_not_found() {
    let temp = TempDir::new().unwrap();
    let err = TemplateDescriptor::load(&temp.path().join("absent.toml")).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ForgeError>(),
        Some(ForgeError::DescriptorNotFound { .. })
    ));
}

#[tokio::test]
async fn test_unknown_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::new("lesson.ini", "template = x").write_to(temp.path()).unwrap();
    let err = TemplateDescriptor::load(&path).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ForgeError>(),
        Some(ForgeError::UnsupportedDescriptorFormat { extension, .. }) if extension == "ini"
    ));
}

#[tokio::test]
async fn test_malformed_content_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::new("broken.json", "{ \"template\": ").write_to(temp.path()).unwrap();
    let err = TemplateDescriptor::load(&path).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ForgeError>(),
        Some(ForgeError::DescriptorParseError { .. })
    ));
}

#[tokio::test]
async fn test_raw_template_has_no_declarations() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::new("notes.txt", "Hi {{who}}\n").write_to(temp.path()).unwrap();
    let descriptor = TemplateDescriptor::load_raw(&path).await.unwrap();

    assert!(descriptor.variables.is_empty());
    assert_eq!(descriptor.template, "Hi {{who}}\n");
}

#[tokio::test]
async fn test_lesson_fixture_validates() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::lesson_markdown().write_to(temp.path()).unwrap();
    let descriptor = TemplateDescriptor::load(&path).await.unwrap();

    let report = validate_descriptor(&descriptor, ParseOptions::default());
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[tokio::test]
async fn test_unbalanced_template_fails_validation() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::unbalanced().write_to(temp.path()).unwrap();
    let descriptor = TemplateDescriptor::load(&path).await.unwrap();

    let report = validate_descriptor(&descriptor, ParseOptions::default());
    assert!(!report.is_valid());
    assert!(report.errors.iter().any(|e| e.starts_with("Template does not parse:")));
}

#[tokio::test]
async fn test_invalid_declarations_are_errors() {
    let temp = TempDir::new().unwrap();
    let path = DescriptorFixture::invalid_declarations().write_to(temp.path()).unwrap();
    let descriptor = TemplateDescriptor::load(&path).await.unwrap();

    let report = validate_descriptor(&descriptor, ParseOptions::default());
    assert!(report.errors.iter().any(|e| e.contains("'level' is declared more than once")));
    assert!(report.errors.iter().any(|e| e.contains("Select variable 'level' has no options")));
}
