//! Render a descriptor or bare template.
//!
//! Input values come from an optional JSON context file and any number of
//! `--set KEY=VALUE` pairs; `--set` wins over the file. The combined values
//! go through the descriptor's declarations (defaults, type coercion) before
//! rendering.
//!
//! # Examples
//!
//! ```bash
//! lessonforge render lesson.md --set className=4B
//! lessonforge render lesson.toml --context inputs.json --output lesson.out.md
//! lessonforge render notes.txt --raw --set 'topics=["soil","water"]'
//! ```
//!
//! `--set` values are text; declared number and boolean variables are
//! coerced. A value starting with `[` is read as a JSON list.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::CliConfig;
use crate::core::ForgeError;
use crate::descriptor::TemplateDescriptor;
use crate::templating::{Context, TemplateRenderer, Value};

#[derive(Args)]
pub struct RenderCommand {
    /// Descriptor file (.toml, .yaml, .yml, .json, .md, .markdown)
    file: PathBuf,

    /// JSON object with input values
    #[arg(long, value_name = "JSON")]
    context: Option<PathBuf>,

    /// Set an input value (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Treat FILE as a bare template with no declarations
    #[arg(long)]
    raw: bool,

    /// Fail when inputs do not satisfy the declared variables
    #[arg(long)]
    strict: bool,
}

impl RenderCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let global = config.load_global_config().await?;

        let descriptor = if self.raw {
            TemplateDescriptor::load_raw(&self.file).await?
        } else {
            TemplateDescriptor::load(&self.file).await?
        };
        let file_name = self.file.display().to_string();
        let template_name = descriptor.display_name(&file_name).to_string();

        let mut supplied = match &self.context {
            Some(path) => load_context_file(path).await?,
            None => Context::new(),
        };
        for assignment in &self.set {
            let (name, value) = parse_assignment(assignment)?;
            supplied.insert(name, value);
        }

        let (context, issues) = descriptor.build_context(&supplied);
        if !issues.is_empty() {
            if self.strict || global.strict_inputs {
                return Err(ForgeError::InputRejected {
                    issues: issues.iter().map(ToString::to_string).collect(),
                }
                .into());
            }
            for issue in &issues {
                eprintln!("{} {}", "⚠".yellow(), issue);
            }
        }

        let renderer = TemplateRenderer::from_config(&global);
        let rendered = renderer.render_template(&descriptor.template, &context).map_err(|e| {
            ForgeError::TemplateSyntax {
                template: template_name.clone(),
                message: e.to_string(),
                report: e.format_with_context(&descriptor.template, Some(&template_name)),
            }
        })?;

        match &self.output {
            Some(path) => {
                write_output(path, &rendered).await?;
                eprintln!("{} Rendered {} to {}", "✓".green(), template_name, path.display());
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.as_bytes()).context("Failed to write to stdout")?;
                stdout.flush().context("Failed to flush stdout")?;
            }
        }
        Ok(())
    }
}

async fn load_context_file(path: &Path) -> Result<Context> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read context file {}", path.display()))?;

    let context = Context::from_json_str(&content).map_err(|e| ForgeError::ContextParseError {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!("Loaded {} value(s) from {}", context.len(), path.display());
    Ok(context)
}

async fn write_output(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, rendered).await.with_context(|| format!("Failed to write {}", path.display()))
}

/// Split `KEY=VALUE`. Values starting with `[` are parsed as JSON lists when
/// they are valid JSON, and kept as text otherwise.
pub(crate) fn parse_assignment(assignment: &str) -> Result<(String, Value), ForgeError> {
    let invalid = || ForgeError::InvalidAssignment {
        assignment: assignment.to_string(),
    };

    let (name, raw) = assignment.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }

    let value = if raw.trim_start().starts_with('[') {
        serde_json::from_str::<serde_json::Value>(raw)
            .ok()
            .and_then(|json| Value::try_from(json).ok())
            .unwrap_or_else(|| Value::from(raw))
    } else {
        Value::from(raw)
    };
    Ok((name.to_string(), value))
}
