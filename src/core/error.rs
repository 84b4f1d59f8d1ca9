//! Error handling for lessonforge
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`ForgeError`]) for failures callers may want
//!    to match on
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable
//!    suggestions for CLI users
//!
//! Template syntax errors have their own type,
//! [`ParseError`](crate::templating::ParseError), since the engine is usable
//! without the rest of the crate. [`user_friendly_error`] recognizes both.
//!
//! # Examples
//!
//! ```rust
//! use lessonforge::core::{ForgeError, user_friendly_error};
//!
//! let error = anyhow::Error::from(ForgeError::DescriptorNotFound {
//!     path: "lesson.toml".to_string(),
//! });
//! let context = user_friendly_error(error);
//! assert!(context.suggestion.is_some());
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::ParseError;

/// Failures raised while loading, validating or rendering descriptors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForgeError {
    /// Descriptor or template file does not exist
    #[error("Template file not found: {path}")]
    DescriptorNotFound {
        /// Path that was looked up
        path: String,
    },

    /// File extension does not map to a known descriptor format
    #[error("Unsupported descriptor format '{extension}' for {path}")]
    UnsupportedDescriptorFormat {
        /// Path of the descriptor
        path: String,
        /// The extension found (empty when the file has none)
        extension: String,
    },

    /// Descriptor file could not be deserialized
    #[error("Invalid descriptor syntax in {file}")]
    DescriptorParseError {
        /// Path of the descriptor
        file: String,
        /// Underlying parser message
        reason: String,
    },

    /// Descriptor failed structural validation
    #[error("Descriptor '{name}' has {count} validation error(s)")]
    InvalidDescriptor {
        /// Descriptor name or file name
        name: String,
        /// Number of errors reported
        count: usize,
    },

    /// Template blocks are unbalanced or nested too deep
    #[error("Template syntax error in {template}: {message}")]
    TemplateSyntax {
        /// Template display name
        template: String,
        /// One-line parse error message
        message: String,
        /// Multi-line report with source context
        report: String,
    },

    /// Context file could not be read as a JSON object of supported values
    #[error("Invalid context file {file}")]
    ContextParseError {
        /// Path of the context file
        file: String,
        /// Underlying parser message
        reason: String,
    },

    /// A `--set` argument without `=`
    #[error("Invalid assignment '{assignment}': expected KEY=VALUE")]
    InvalidAssignment {
        /// The argument as given
        assignment: String,
    },

    /// Inputs did not satisfy the declared variables in strict mode
    #[error("{} input issue(s) found", issues.len())]
    InputRejected {
        /// Human-readable issue descriptions
        issues: Vec<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Catch-all for errors without a dedicated variant
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// A [`ForgeError`] with an optional suggestion and details for display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ForgeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: ForgeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow and the
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions for the CLI.
///
/// Recognizes [`ForgeError`], [`ParseError`], [`std::io::Error`] and
/// [`toml::de::Error`] anywhere in the error chain. Anything else is reported
/// with its full chain of causes.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(forge_error) = error.chain().find_map(|e| e.downcast_ref::<ForgeError>()) {
        return create_error_context(forge_error.clone());
    }

    if let Some(parse_error) = error.chain().find_map(|e| e.downcast_ref::<ParseError>()) {
        return ErrorContext::new(ForgeError::TemplateSyntax {
            template: "template".to_string(),
            message: parse_error.to_string(),
            report: String::new(),
        })
        .with_suggestion("Check that every {{#if}} has a matching {{/if}} and every {{#each}} a matching {{/each}}");
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        let suggestion = match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                Some("Check that the file or directory exists and the path is correct")
            }
            std::io::ErrorKind::PermissionDenied => {
                Some("Check the file permissions or choose a location you can write to")
            }
            std::io::ErrorKind::InvalidData => Some("Templates and descriptors must be UTF-8 text"),
            _ => None,
        };
        if let Some(suggestion) = suggestion {
            return ErrorContext::new(ForgeError::Other {
                message: format_chain(&error),
            })
            .with_suggestion(suggestion);
        }
    }

    if let Some(toml_error) = error.chain().find_map(|e| e.downcast_ref::<toml::de::Error>()) {
        return ErrorContext::new(ForgeError::ConfigError {
            message: format_chain(&error),
        })
        .with_suggestion("Check the TOML syntax. Verify quotes, brackets, and value types")
        .with_details(toml_error.message().to_string());
    }

    ErrorContext::new(ForgeError::Other {
        message: format_chain(&error),
    })
}

/// The error message followed by its numbered causes.
fn format_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn create_error_context(error: ForgeError) -> ErrorContext {
    match &error {
        ForgeError::DescriptorNotFound {
            path,
        } => {
            let suggestion = format!("Check the path '{path}'. Descriptors end in .toml, .yaml, .json or .md");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        ForgeError::UnsupportedDescriptorFormat {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Rename the file to .toml, .yaml, .yml, .json, .md or .markdown, or pass --raw to render it as a bare template"),

        ForgeError::DescriptorParseError {
            reason,
            ..
        } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Field names are camelCase (defaultValue, conditionalSections, customPrompts) and `template` is required")
        }

        ForgeError::InvalidDescriptor {
            name,
            ..
        } => {
            let suggestion = format!("Run 'lessonforge validate {name}' to see each error");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        ForgeError::TemplateSyntax {
            report,
            ..
        } => {
            let details = report.clone();
            let context = ErrorContext::new(error);
            if details.is_empty() {
                context
            } else {
                context.with_details(details)
            }
        }

        ForgeError::ContextParseError {
            reason,
            ..
        } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("The context file must be a JSON object whose values are text, numbers, booleans, lists or null")
        }

        ForgeError::InvalidAssignment {
            ..
        } => ErrorContext::new(error).with_suggestion("Use --set name=value, for example --set title=Fractions"),

        ForgeError::InputRejected {
            issues,
        } => {
            let details = issues.join("\n");
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Supply the missing values with --set or a context file, or drop --strict")
        }

        ForgeError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'lessonforge config path' to locate the file and 'lessonforge config show' to inspect it"),

        ForgeError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
