//! Global configuration for lessonforge.
//!
//! The global configuration file holds user-wide engine limits and rendering
//! preferences. It is optional: a missing file yields the defaults.
//!
//! # Configuration File Location
//!
//! - **Unix/macOS**: `~/.lessonforge/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\lessonforge\config.toml`
//!
//! The location can be overridden per invocation with `--config <path>`.
//!
//! # File Format
//!
//! ```toml
//! # Reject templates with blocks nested deeper than this (at most 1024)
//! max_depth = 32
//!
//! # Stop iterating after this many loop iterations per render
//! max_iterations = 10000
//!
//! # Reuse parsed templates between renders in one process
//! cache = true
//!
//! # Fail `render` when inputs do not match the declared variables
//! strict_inputs = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

pub use crate::templating::{DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING};
use crate::templating::{ParseOptions, RenderLimits};

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

const fn default_cache() -> bool {
    true
}

/// User-wide settings stored in `config.toml`.
///
/// # Examples
///
/// ```rust
/// use lessonforge::config::GlobalConfig;
///
/// let config: GlobalConfig = toml::from_str("max_iterations = 500").unwrap();
/// assert_eq!(config.max_depth, 64);
/// assert_eq!(config.render_limits().max_iterations, Some(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlobalConfig {
    /// Maximum number of nested `{{#if}}`/`{{#each}}` blocks accepted by the
    /// parser, between 1 and [`MAX_DEPTH_CEILING`].
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Total loop iterations allowed in one render. Unlimited when unset.
    #[serde(default)]
    pub max_iterations: Option<usize>,

    /// Whether parsed templates are cached for the life of the process.
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Treat input issues (missing required values, bad numbers) as errors.
    #[serde(default)]
    pub strict_inputs: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_iterations: None,
            cache: true,
            strict_inputs: false,
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from the default location.
    ///
    /// A missing file yields the default configuration in both cases.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// sets `max_depth` outside `1..=MAX_DEPTH_CEILING`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate().with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Write the annotated [`example_toml`](Self::example_toml) to `path`,
    /// creating parent directories as needed. An existing file is replaced.
    pub async fn write_example(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::example_toml())
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Platform-specific location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data, on Windows) directory
    /// cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("lessonforge")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".lessonforge")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Reject values the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            anyhow::bail!("max_depth must be at least 1");
        }
        if self.max_depth > MAX_DEPTH_CEILING {
            anyhow::bail!(
                "max_depth must be at most {MAX_DEPTH_CEILING}, got {}",
                self.max_depth
            );
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::with_max_depth(self.max_depth)
    }

    pub fn render_limits(&self) -> RenderLimits {
        RenderLimits {
            max_iterations: self.max_iterations,
        }
    }

    /// Annotated configuration written by `config init`.
    pub fn example_toml() -> String {
        format!(
            "# lessonforge configuration\n\
             \n\
             # Reject templates with blocks nested deeper than this (at most {MAX_DEPTH_CEILING})\n\
             max_depth = {DEFAULT_MAX_DEPTH}\n\
             \n\
             # Stop iterating after this many loop iterations per render\n\
             # max_iterations = 10000\n\
             \n\
             # Reuse parsed templates between renders in one process\n\
             cache = true\n\
             \n\
             # Fail `render` when inputs do not match the declared variables\n\
             strict_inputs = false\n"
        )
    }
}
