//! Show what a descriptor declares and what its template uses.
//!
//! # Examples
//!
//! ```bash
//! lessonforge inspect lesson.md
//! lessonforge inspect notes.txt --raw
//! lessonforge inspect lesson.yaml --format json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{CliConfig, OutputFormat};
use crate::core::ForgeError;
use crate::descriptor::{ConditionalSection, TemplateDescriptor, TemplateMetadata, Variable};
use crate::templating::References;

#[derive(Args)]
pub struct InspectCommand {
    /// Descriptor file to inspect
    file: PathBuf,

    /// Treat FILE as a bare template with no declarations
    #[arg(long)]
    raw: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport<'a> {
    name: &'a str,
    variables: &'a [Variable],
    conditional_sections: &'a [ConditionalSection],
    references: References,
    depth: usize,
    outline: Vec<String>,
    #[serde(skip_serializing_if = "metadata_is_empty")]
    metadata: &'a TemplateMetadata,
    custom_prompts: &'a BTreeMap<String, String>,
}

fn metadata_is_empty(metadata: &&TemplateMetadata) -> bool {
    metadata.is_empty()
}

impl InspectCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let global = config.load_global_config().await?;
        let descriptor = if self.raw {
            TemplateDescriptor::load_raw(&self.file).await?
        } else {
            TemplateDescriptor::load(&self.file).await?
        };
        let file = self.file.display().to_string();
        let name = descriptor.display_name(&file);

        let ast = descriptor.parse(global.parse_options()).map_err(|e| ForgeError::TemplateSyntax {
            template: name.to_string(),
            message: e.to_string(),
            report: e.format_with_context(&descriptor.template, Some(name)),
        })?;

        let report = InspectReport {
            name,
            variables: &descriptor.variables,
            conditional_sections: &descriptor.conditional_sections,
            references: ast.references(),
            depth: ast.depth(),
            outline: ast.outline().lines().map(String::from).collect(),
            metadata: &descriptor.metadata,
            custom_prompts: &descriptor.custom_prompts,
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => print_text(&report),
        }
        Ok(())
    }
}

fn print_text(report: &InspectReport<'_>) {
    println!("{}", report.name.bold());

    if !report.variables.is_empty() {
        println!("\n{}", "Variables:".cyan());
        for variable in report.variables {
            let mut traits = vec![variable.var_type.to_string()];
            if variable.required {
                traits.push("required".to_string());
            }
            if let Some(default) = &variable.default_value {
                traits.push(format!("default {default}"));
            }
            if !variable.options.is_empty() {
                traits.push(format!("options: {}", variable.options.join(" | ")));
            }
            println!("  {} ({}) - {}", variable.name, traits.join(", "), variable.display_label());
        }
    }

    if !report.conditional_sections.is_empty() {
        println!("\n{}", "Conditional sections:".cyan());
        for section in report.conditional_sections {
            println!("  {}: {} [if {}]", section.id, section.name, section.condition);
        }
    }

    let refs = &report.references;
    println!("\n{}", "Template references:".cyan());
    println!("  variables:  {}", join_or_none(&refs.variables));
    println!("  conditions: {}", join_or_none(&refs.conditions));
    println!("  iterations: {}", join_or_none(&refs.sources));

    println!("\n{} (depth {})", "Outline:".cyan(), report.depth);
    for line in &report.outline {
        println!("  {line}");
    }

    if !report.custom_prompts.is_empty() {
        let keys: Vec<String> = report.custom_prompts.keys().cloned().collect();
        println!("\n{} {}", "Custom prompts:".cyan(), keys.join(", "));
    }

    let metadata = report.metadata;
    if !metadata.is_empty() {
        println!("\n{}", "Metadata:".cyan());
        if let Some(author) = &metadata.author {
            println!("  author: {author}");
        }
        if let Some(version) = &metadata.version {
            println!("  version: {version}");
        }
        if !metadata.tags.is_empty() {
            println!("  tags: {}", metadata.tags.join(", "));
        }
        if let Some(difficulty) = &metadata.difficulty {
            println!("  difficulty: {difficulty}");
        }
        if let Some(time) = &metadata.estimated_time {
            println!("  estimated time: {time}");
        }
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
