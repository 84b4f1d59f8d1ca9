//! Command-line interface for lessonforge.
//!
//! # Commands
//!
//! - `render` - Render a descriptor (or a bare template with `--raw`)
//! - `validate` - Check a descriptor for structural problems
//! - `inspect` - Show declarations, template references and block outline
//! - `config` - Show, locate or create the global configuration file
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging on stderr
//! - `--quiet` / `-q`: only errors on stderr
//! - `--config` / `-c`: path to an alternate configuration file
//!
//! Without `--verbose` or `--quiet` the log level comes from `RUST_LOG`,
//! defaulting to `warn`. Logs always go to stderr so rendered output on
//! stdout can be piped.
//!
//! # Examples
//!
//! ```bash
//! lessonforge render lesson.md --set className=4B --set includeHomework=yes
//! lessonforge render worksheet.toml --context answers.json --output out.md
//! lessonforge validate lesson.yaml --format json
//! lessonforge inspect lesson.md
//! lessonforge config init
//! ```

mod config;
mod inspect;
mod render;
pub mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;

/// Output format for commands that produce reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings derived from the global flags, shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive, or `None` to defer to `RUST_LOG`
    pub log_level: Option<String>,

    /// Alternate configuration file from `--config`
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the global configuration, honouring `--config`.
    pub async fn load_global_config(&self) -> Result<GlobalConfig> {
        GlobalConfig::load_with_optional(self.config_path.clone()).await
    }
}

#[derive(Parser)]
#[command(
    name = "lessonforge",
    about = "Render lesson and worksheet templates",
    version,
    long_about = "lessonforge renders document templates with {{variables}}, {{#if}} sections and {{#each}} lists from descriptor files."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an alternate configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a descriptor or template
    Render(render::RenderCommand),

    /// Check a descriptor for structural problems
    Validate(validate::ValidateCommand),

    /// Show a descriptor's declarations and template structure
    Inspect(inspect::InspectCommand),

    /// Manage the global configuration file
    Config(config::ConfigCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        init_logging(config.log_level.as_deref());
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Render(cmd) => cmd.execute(&config).await,
            Commands::Validate(cmd) => cmd.execute(&config).await,
            Commands::Inspect(cmd) => cmd.execute(&config).await,
            Commands::Config(cmd) => cmd.execute(&config).await,
        }
    }
}

/// Install the stderr log subscriber.
///
/// `level` wins over `RUST_LOG`; with neither, only warnings and errors are
/// shown. Calling this more than once is harmless.
pub fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
