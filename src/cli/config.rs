//! Manage the global lessonforge configuration.
//!
//! # Examples
//!
//! ```bash
//! lessonforge config          # same as `config show`
//! lessonforge config show
//! lessonforge config path
//! lessonforge config init
//! lessonforge config init --force
//! ```
//!
//! `--config <path>` points every subcommand at an alternate file.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tokio::fs;

use super::CliConfig;
use crate::config::GlobalConfig;
use crate::core::ForgeError;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write an annotated configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,
}

impl ConfigCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let path = match &config.config_path {
            Some(path) => path.clone(),
            None => GlobalConfig::default_path()?,
        };

        match self.command.unwrap_or(ConfigSubcommands::Show) {
            ConfigSubcommands::Init {
                force,
            } => init(path, force).await,
            ConfigSubcommands::Show => show(config, path).await,
            ConfigSubcommands::Path => {
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

async fn init(path: PathBuf, force: bool) -> Result<()> {
    if fs::try_exists(&path).await.unwrap_or(false) && !force {
        return Err(ForgeError::ConfigError {
            message: format!("{} already exists (use --force to overwrite)", path.display()),
        }
        .into());
    }

    GlobalConfig::write_example(&path).await?;

    println!("{} Created {}", "✓".green(), path.display());
    Ok(())
}

async fn show(config: &CliConfig, path: PathBuf) -> Result<()> {
    let global = config.load_global_config().await?;
    let exists = fs::try_exists(&path).await.unwrap_or(false);

    let source = if exists {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };
    println!("{} {}", "Configuration:".cyan(), source);
    println!("  max_depth      = {}", global.max_depth);
    println!(
        "  max_iterations = {}",
        global.max_iterations.map_or_else(|| "unlimited".to_string(), |n| n.to_string())
    );
    println!("  cache          = {}", global.cache);
    println!("  strict_inputs  = {}", global.strict_inputs);
    Ok(())
}
