//! Validate a descriptor.
//!
//! Loads the descriptor, checks its declarations and template structure, and
//! prints errors and warnings. Exits with an error when any errors were found;
//! warnings alone do not fail.
//!
//! # Examples
//!
//! ```bash
//! lessonforge validate lesson.md
//! lessonforge validate lesson.toml --format json
//! ```
//!
//! # JSON Output
//!
//! ```json
//! {
//!   "valid": false,
//!   "file": "lesson.toml",
//!   "errors": ["Select variable 'level' has no options"],
//!   "warnings": ["Variable 'spare' is declared but never used"]
//! }
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::{CliConfig, OutputFormat};
use crate::core::ForgeError;
use crate::descriptor::{TemplateDescriptor, ValidationReport, validate_descriptor};

#[derive(Args)]
pub struct ValidateCommand {
    /// Descriptor file to validate
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Machine-readable validation outcome.
#[derive(Debug, Serialize)]
pub struct ValidationResults {
    pub valid: bool,
    pub file: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResults {
    fn from_report(file: String, report: ValidationReport) -> Self {
        Self {
            valid: report.is_valid(),
            file,
            errors: report.errors,
            warnings: report.warnings,
        }
    }
}

impl ValidateCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let global = config.load_global_config().await?;
        let file = self.file.display().to_string();

        let descriptor = match TemplateDescriptor::load(&self.file).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                if self.format == OutputFormat::Json {
                    let results = ValidationResults {
                        valid: false,
                        file,
                        errors: vec![format!("{e:#}")],
                        warnings: Vec::new(),
                    };
                    println!("{}", serde_json::to_string_pretty(&results)?);
                }
                return Err(e);
            }
        };

        let report = validate_descriptor(&descriptor, global.parse_options());
        let name = descriptor.display_name(&file).to_string();
        let error_count = report.errors.len();
        let results = ValidationResults::from_report(file.clone(), report);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            OutputFormat::Text => print_text(&name, &results),
        }

        if error_count > 0 {
            return Err(ForgeError::InvalidDescriptor {
                name: file,
                count: error_count,
            }
            .into());
        }
        Ok(())
    }
}

fn print_text(name: &str, results: &ValidationResults) {
    for error in &results.errors {
        println!("{} {}", "✗".red(), error);
    }
    for warning in &results.warnings {
        println!("{} {}", "⚠".yellow(), warning);
    }

    if results.valid {
        let suffix = match results.warnings.len() {
            0 => String::new(),
            n => format!(" ({n} warning(s))"),
        };
        println!("{} {} is valid{}", "✓".green(), name, suffix);
    } else {
        println!(
            "{} {} has {} error(s) and {} warning(s)",
            "✗".red(),
            name,
            results.errors.len(),
            results.warnings.len()
        );
    }
}
