//! Template descriptors.
//!
//! A [`TemplateDescriptor`] is the unit authors work with: the template text
//! plus the form fields ([`Variable`]s) and toggles ([`ConditionalSection`]s)
//! that feed it. Declarations are advisory. The engine renders whatever the
//! template references and never checks it against the declarations;
//! [`validation`] reports mismatches as warnings.
//!
//! Descriptors can be stored as TOML, YAML, JSON, or Markdown with YAML
//! frontmatter (see [`io`]). Field names are camelCase in every format.
//!
//! ```yaml
//! ---
//! name: Fractions warm-up
//! variables:
//!   - name: className
//!     type: text
//!     label: Class
//!     required: true
//!   - name: minutes
//!     type: number
//!     defaultValue: 10
//! conditionalSections:
//!   - id: homework
//!     name: Homework
//!     condition: includeHomework
//! metadata:
//!   tags: [math, grade-4]
//!   estimatedTime: 10
//! ---
//! # Warm-up for {{className}} ({{minutes}} min)
//! {{#if includeHomework}}Homework: page 12{{/if}}
//! ```

pub mod inputs;
pub mod io;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::templating::{Ast, Context, ParseError, ParseOptions, Value, parse_with_options};

pub use inputs::InputIssue;
pub use io::DescriptorFormat;
pub use validation::{ValidationReport, validate_descriptor};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Kind of form input a variable is collected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Single-line text
    #[default]
    #[serde(alias = "string")]
    Text,
    /// Multi-line text
    Textarea,
    Number,
    #[serde(alias = "bool")]
    Boolean,
    /// One of a fixed list of options
    Select,
}

impl VariableType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Select => "select",
        }
    }

    /// Whether `value` has the shape this type produces.
    ///
    /// `Null` is accepted by every type.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Text | Self::Textarea | Self::Select, Value::Text(_)) => true,
            (Self::Number, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared template input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Name used in the template body
    pub name: String,

    #[serde(rename = "type", default)]
    pub var_type: VariableType,

    /// Form label; falls back to `name` when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Allowed values for `select` variables, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, var_type: VariableType) -> Self {
        Self {
            name: name.into(),
            var_type,
            label: String::new(),
            required: false,
            default_value: None,
            options: Vec::new(),
            description: None,
        }
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// A named toggle controlling one `{{#if}}` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalSection {
    pub id: String,
    pub name: String,
    /// Context key the section's `{{#if}}` tests
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Expected time to complete, as minutes or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EstimatedTime {
    Minutes(u32),
    Text(String),
}

impl fmt::Display for EstimatedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes(m) => write!(f, "{m} min"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

/// Descriptive information. Never consulted while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<EstimatedTime>,
}

impl TemplateMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A template together with its declared inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Raw template text
    pub template: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_sections: Vec<ConditionalSection>,

    /// Prompt overrides for an external generation step, keyed by purpose
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_prompts: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "TemplateMetadata::is_empty")]
    pub metadata: TemplateMetadata,
}

impl TemplateDescriptor {
    /// A descriptor with only template text, as used for `--raw` renders.
    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn conditional_section(&self, id: &str) -> Option<&ConditionalSection> {
        self.conditional_sections.iter().find(|s| s.id == id)
    }

    /// Every name the declarations make available to the template: variable
    /// names and section conditions, in declaration order.
    pub fn declared_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let declared = self
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .chain(self.conditional_sections.iter().map(|s| s.condition.as_str()));
        for name in declared {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Parse the template text.
    pub fn parse(&self, options: ParseOptions) -> Result<Ast, ParseError> {
        parse_with_options(&self.template, options)
    }

    /// Apply declared defaults and type coercions to `supplied`.
    ///
    /// See [`inputs::build_context`].
    pub fn build_context(&self, supplied: &Context) -> (Context, Vec<InputIssue>) {
        inputs::build_context(self, supplied)
    }

    /// Name used in messages: the descriptor name, or `fallback`.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }
}
