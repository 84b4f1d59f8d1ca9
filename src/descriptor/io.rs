//! Loading descriptors from disk.
//!
//! The format is chosen by file extension:
//!
//! | Extension            | Format                                          |
//! |----------------------|-------------------------------------------------|
//! | `.toml`              | TOML                                            |
//! | `.yaml`, `.yml`      | YAML                                            |
//! | `.json`              | JSON                                            |
//! | `.md`, `.markdown`   | YAML frontmatter, document body is the template |

use anyhow::{Context, Result};
use gray_matter::Matter;
use gray_matter::engine::YAML;
use std::path::Path;
use tokio::fs;

use super::TemplateDescriptor;
use crate::core::ForgeError;

/// On-disk descriptor formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Toml,
    Yaml,
    Json,
    /// YAML frontmatter followed by the template body
    Markdown,
}

impl DescriptorFormat {
    /// Pick the format for `path` from its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ForgeError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            _ => Err(ForgeError::UnsupportedDescriptorFormat {
                path: path.display().to_string(),
                extension,
            }),
        }
    }

    /// Deserialize a descriptor from `content`.
    ///
    /// # Errors
    ///
    /// Returns the underlying parser message when `content` is not a valid
    /// descriptor in this format.
    pub fn parse(self, content: &str) -> Result<TemplateDescriptor, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Markdown => parse_markdown(content),
        }
    }
}

/// Split frontmatter from body and deserialize the frontmatter with the body
/// as its `template` field.
fn parse_markdown(content: &str) -> Result<TemplateDescriptor, String> {
    let matter = Matter::<YAML>::new();
    let parsed = matter.parse::<serde_yaml::Value>(content).map_err(|e| e.to_string())?;

    let mut fields = match parsed.data {
        Some(serde_yaml::Value::Mapping(map)) => map,
        Some(serde_yaml::Value::Null) | None => serde_yaml::Mapping::new(),
        Some(_) => return Err("frontmatter must be a mapping of descriptor fields".to_string()),
    };
    if fields.contains_key("template") {
        return Err("`template` must not be set in frontmatter; the document body is the template".to_string());
    }
    fields.insert("template".into(), serde_yaml::Value::String(parsed.content));

    serde_yaml::from_value(serde_yaml::Value::Mapping(fields)).map_err(|e| e.to_string())
}

impl TemplateDescriptor {
    /// Load a descriptor file, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// - [`ForgeError::DescriptorNotFound`] if `path` does not exist
    /// - [`ForgeError::UnsupportedDescriptorFormat`] for unknown extensions
    /// - [`ForgeError::DescriptorParseError`] if the content does not
    ///   deserialize
    pub async fn load(path: &Path) -> Result<Self> {
        let format = DescriptorFormat::from_path(path)?;
        let content = read_source(path).await?;

        tracing::debug!("Loading {:?} descriptor from {}", format, path.display());
        let descriptor = format.parse(&content).map_err(|reason| ForgeError::DescriptorParseError {
            file: path.display().to_string(),
            reason,
        })?;

        tracing::debug!(
            "Loaded descriptor with {} variable(s) and {} conditional section(s)",
            descriptor.variables.len(),
            descriptor.conditional_sections.len()
        );
        Ok(descriptor)
    }

    /// Load a bare template file with no declarations.
    pub async fn load_raw(path: &Path) -> Result<Self> {
        let content = read_source(path).await?;
        Ok(Self::from_template(content))
    }
}

async fn read_source(path: &Path) -> Result<String> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(ForgeError::DescriptorNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    fs::read_to_string(path).await.with_context(|| format!("Failed to read {}", path.display()))
}
