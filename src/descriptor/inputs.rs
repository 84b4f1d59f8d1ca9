//! Turning form input into a rendering context.
//!
//! Form fields arrive as text, so inputs are coerced to each variable's
//! declared type before rendering: `"3"` becomes a number for `number`
//! variables and `"yes"` becomes `true` for `boolean` ones. Problems are
//! collected as [`InputIssue`]s instead of failing; the caller decides
//! whether they matter.

use thiserror::Error;

use super::{TemplateDescriptor, Variable, VariableType};
use crate::templating::{Context, Value};

/// Something wrong with a supplied (or missing) input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputIssue {
    #[error("'{label}' ({name}) is required but was not provided")]
    MissingRequired {
        name: String,
        label: String,
    },

    #[error("'{name}' expects a number, got '{value}'")]
    NotANumber {
        name: String,
        value: String,
    },

    #[error("'{name}' expects yes/no, got '{value}'")]
    NotABoolean {
        name: String,
        value: String,
    },

    #[error("'{name}' must be one of [{}], got '{value}'", options.join(", "))]
    NotAnOption {
        name: String,
        value: String,
        options: Vec<String>,
    },

    #[error("'{name}' is declared as {expected} but was given a {found}")]
    WrongType {
        name: String,
        expected: VariableType,
        found: &'static str,
    },
}

impl InputIssue {
    /// Name of the variable the issue is about.
    pub fn name(&self) -> &str {
        match self {
            Self::MissingRequired {
                name,
                ..
            }
            | Self::NotANumber {
                name,
                ..
            }
            | Self::NotABoolean {
                name,
                ..
            }
            | Self::NotAnOption {
                name,
                ..
            }
            | Self::WrongType {
                name,
                ..
            } => name,
        }
    }
}

/// Build the context for rendering `descriptor` from user-supplied values.
///
/// - Supplied entries are kept, including names no variable declares.
/// - Blank or absent variables take their `defaultValue`. Absent booleans
///   without a default are bound to `false`.
/// - Text is coerced to the declared type where possible. Values that cannot
///   be coerced are kept unchanged and reported.
/// - Non-text values (from a JSON context file, say) must already have the
///   declared type. Mismatches are kept unchanged and reported.
///
/// # Examples
///
/// ```
/// use lessonforge::descriptor::{TemplateDescriptor, Variable, VariableType};
/// use lessonforge::templating::{Context, Value};
///
/// let mut descriptor = TemplateDescriptor::from_template("{{count}}");
/// descriptor.variables.push(Variable::new("count", VariableType::Number));
///
/// let (ctx, issues) = descriptor.build_context(&Context::new().with("count", "3"));
/// assert_eq!(ctx.get("count"), Some(&Value::Number(3.0)));
/// assert!(issues.is_empty());
/// ```
pub fn build_context(descriptor: &TemplateDescriptor, supplied: &Context) -> (Context, Vec<InputIssue>) {
    let mut context = supplied.clone();
    let mut issues = Vec::new();

    for variable in &descriptor.variables {
        match supplied.get(&variable.name).filter(|v| !is_blank(v)) {
            Some(value) => {
                if let Some(coerced) = coerce(variable, value, &mut issues) {
                    context.insert(variable.name.clone(), coerced);
                }
            }
            None => {
                if let Some(default) = &variable.default_value {
                    context.insert(variable.name.clone(), default.clone());
                } else if variable.var_type == VariableType::Boolean {
                    context.insert(variable.name.clone(), false);
                } else if variable.required {
                    issues.push(InputIssue::MissingRequired {
                        name: variable.name.clone(),
                        label: variable.display_label().to_string(),
                    });
                }
            }
        }
    }

    if !issues.is_empty() {
        tracing::debug!("{} input issue(s) while building context", issues.len());
    }
    (context, issues)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Returns the coerced value when it differs from `value`.
fn coerce(variable: &Variable, value: &Value, issues: &mut Vec<InputIssue>) -> Option<Value> {
    let Value::Text(text) = value else {
        if !variable.var_type.accepts(value) {
            issues.push(InputIssue::WrongType {
                name: variable.name.clone(),
                expected: variable.var_type,
                found: value.type_name(),
            });
        }
        return None;
    };
    let trimmed = text.trim();

    match variable.var_type {
        VariableType::Number => match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Value::Number(n)),
            _ => {
                issues.push(InputIssue::NotANumber {
                    name: variable.name.clone(),
                    value: text.clone(),
                });
                None
            }
        },
        VariableType::Boolean => match parse_flag(trimmed) {
            Some(flag) => Some(Value::Bool(flag)),
            None => {
                issues.push(InputIssue::NotABoolean {
                    name: variable.name.clone(),
                    value: text.clone(),
                });
                None
            }
        },
        VariableType::Select => {
            if !variable.options.is_empty() && !variable.options.iter().any(|o| o == text) {
                issues.push(InputIssue::NotAnOption {
                    name: variable.name.clone(),
                    value: text.clone(),
                    options: variable.options.clone(),
                });
            }
            None
        }
        VariableType::Text | VariableType::Textarea => None,
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "on" | "1" => Some(true),
        "no" | "n" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}
