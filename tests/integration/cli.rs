//! Integration tests for the `lessonforge` binary.

use assert_cmd::Command;
use lessonforge::test_utils::DescriptorFixture;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const RENDERED_LESSON: &str =
    "# Photosynthesis for Class 4B\nLab: bring goggles\n1. Observe\n2. Record\nDuration: 45 min\n";

/// Command pointed at a per-test config file so the user's real config is never read.
fn lessonforge(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lessonforge").unwrap();
    cmd.current_dir(temp.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_path(temp));
    cmd
}

fn config_path(temp: &TempDir) -> PathBuf {
    temp.path().join("config.toml")
}

fn write_fixture(temp: &TempDir, fixture: DescriptorFixture) -> PathBuf {
    fixture.write_to(temp.path()).unwrap()
}

#[test]
fn test_render_to_stdout() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_toml());

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .args(["--set", "topic=Photosynthesis", "--set", "includeLab=yes"])
        .args(["--set", r#"steps=["Observe","Record"]"#])
        .assert()
        .success()
        .stdout(RENDERED_LESSON);
}

#[test]
fn test_render_with_context_file() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_yaml());
    let context = temp.path().join("inputs.json");
    fs::write(
        &context,
        r#"{"topic": "Photosynthesis", "includeLab": true, "steps": ["Observe", "Record"], "minutes": "30"}"#,
    )
    .unwrap();

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .arg("--context")
        .arg(&context)
        .args(["--set", "minutes=45"])
        .assert()
        .success()
        .stdout(RENDERED_LESSON);
}

#[test]
fn test_render_to_output_file() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_markdown());
    let output = temp.path().join("out").join("lesson.md");

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .args(["--set", "topic=Photosynthesis", "--set", "includeLab=yes"])
        .args(["--set", r#"steps=["Observe","Record"]"#])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("Rendered Photosynthesis to"));

    let rendered = fs::read_to_string(&output).unwrap();
    assert_eq!(rendered.trim(), RENDERED_LESSON.trim());
}

#[test]
fn test_render_warns_on_missing_required_input() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_toml());

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#  for Class 4B\n"))
        .stderr(predicate::str::contains("'Topic' (topic) is required but was not provided"));
}

#[test]
fn test_render_strict_rejects_bad_inputs() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_toml());

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .args(["--strict", "--set", "topic=Soil", "--set", "minutes=lots"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("1 input issue(s) found"))
        .stderr(predicate::str::contains("'minutes' expects a number, got 'lots'"));
}

#[test]
fn test_strict_inputs_from_config_file() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_toml());
    fs::write(config_path(&temp), "strict_inputs = true\n").unwrap();

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("input issue(s) found"));
}

#[test]
fn test_render_raw_template() {
    let temp = TempDir::new().unwrap();
    let fixture = DescriptorFixture::new("notes.txt", "Hello {{who}}!{{#each xs}} {{this}}{{/each}}\n");
    let path = write_fixture(&temp, fixture);

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .args(["--raw", "--set", "who=World", "--set", r#"xs=["a","b"]"#])
        .assert()
        .success()
        .stdout("Hello World! a b\n");
}

#[test]
fn test_render_syntax_error_fails() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::unbalanced());

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("unclosed"))
        .stderr(predicate::str::contains("#each steps"));
}

#[test]
fn test_render_missing_file_fails() {
    let temp = TempDir::new().unwrap();

    lessonforge(&temp)
        .args(["render", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template file not found"));
}

#[test]
fn test_render_rejects_bad_assignment() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_toml());

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .args(["--set", "topic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_validate_valid_descriptor() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_markdown());

    lessonforge(&temp)
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Photosynthesis is valid"));
}

#[test]
fn test_validate_invalid_descriptor() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::invalid_declarations());

    lessonforge(&temp)
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("✗ Variable 'level' is declared more than once"))
        .stdout(predicate::str::contains("Quiz has"))
        .stderr(predicate::str::contains("validation error(s)"));
}

#[test]
fn test_validate_json_output() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::unbalanced());

    let output = lessonforge(&temp)
        .arg("validate")
        .arg(&path)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results["valid"], false);
    let errors = results["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e.as_str().unwrap().starts_with("Template does not parse:")));
}

#[test]
fn test_inspect_text() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_toml());

    lessonforge(&temp)
        .arg("inspect")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Photosynthesis"))
        .stdout(predicate::str::contains("Variables:"))
        .stdout(predicate::str::contains("lab: Lab work [if includeLab]"))
        .stdout(predicate::str::contains("iterations: steps"))
        .stdout(predicate::str::contains("Outline: (depth 1)"))
        .stdout(predicate::str::contains("#each steps"))
        .stdout(predicate::str::contains("author: Science dept"));
}

#[test]
fn test_inspect_json() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_json());

    let output = lessonforge(&temp)
        .arg("inspect")
        .arg(&path)
        .args(["-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["name"], "Photosynthesis");
    assert_eq!(report["variables"].as_array().unwrap().len(), 4);
    assert_eq!(report["depth"], 1);
    assert_eq!(report["references"]["sources"][0], "steps");
}

#[test]
fn test_config_path_uses_override() {
    let temp = TempDir::new().unwrap();

    lessonforge(&temp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_and_show() {
    let temp = TempDir::new().unwrap();

    lessonforge(&temp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("not found, using defaults"))
        .stdout(predicate::str::contains("max_depth      = 64"));

    lessonforge(&temp)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    let written = fs::read_to_string(config_path(&temp)).unwrap();
    assert!(written.starts_with("# lessonforge configuration\n"));
    assert!(written.contains("max_depth = 64\n"));

    lessonforge(&temp)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    fs::write(config_path(&temp), "max_depth = 8\n").unwrap();
    lessonforge(&temp).args(["config", "init", "--force"]).assert().success();
    assert_eq!(fs::read_to_string(config_path(&temp)).unwrap(), written);

    fs::write(config_path(&temp), "max_depth = 8\nmax_iterations = 100\n").unwrap();
    lessonforge(&temp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_depth      = 8"))
        .stdout(predicate::str::contains("max_iterations = 100"));
}

#[test]
fn test_invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_toml());
    fs::write(config_path(&temp), "max_depth = 0\n").unwrap();

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depth must be at least 1"));
}

#[test]
fn test_oversized_max_depth_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_toml());
    fs::write(config_path(&temp), "max_depth = 1000000\n").unwrap();

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depth must be at most 1024"));
}

#[test]
fn test_deeply_nested_template_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let depth = 20_000;
    let template = format!("{}x{}", "{{#if a}}".repeat(depth), "{{/if}}".repeat(depth));
    let path = write_fixture(&temp, DescriptorFixture::new("deep.txt", &template));

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .args(["--raw", "--set", "a=yes"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("nested deeper than 64 levels"));
}

#[test]
fn test_strict_rejects_wrongly_typed_context_values() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(&temp, DescriptorFixture::lesson_yaml());
    let context = temp.path().join("inputs.json");
    fs::write(&context, r#"{"topic": "Soil", "minutes": true}"#).unwrap();

    lessonforge(&temp)
        .arg("render")
        .arg(&path)
        .arg("--context")
        .arg(&context)
        .arg("--strict")
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("'minutes' is declared as number but was given a boolean"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let temp = TempDir::new().unwrap();

    lessonforge(&temp)
        .args(["-v", "-q", "config", "path"])
        .assert()
        .failure()
        .code(2);
}
