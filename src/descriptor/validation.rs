//! Structural validation of descriptors.
//!
//! Errors describe descriptors that are broken: unbalanced template blocks,
//! duplicate or malformed names, select variables without options. Warnings
//! are advisory. The engine renders templates whose references do not match
//! the declarations, so mismatches are only ever warnings.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;
use strsim::levenshtein;

use super::{TemplateDescriptor, VariableType};
use crate::templating::lexer::{INDEX_NAME, THIS_NAME, TokenKind, is_identifier, tokenize};
use crate::templating::{ParseOptions, Value, parse_with_options};

/// Maximum edit distance for suggestions, as a percentage of the name length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// `{{ ... }}` with no nested braces; inside literal text this is a marker
/// the lexer did not recognize.
fn malformed_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{[^{}]*\}\}").unwrap_or_else(|e| unreachable!("invalid marker regex: {e}"))
    })
}

/// Errors and warnings found in one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when there are no errors. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Check `descriptor` for structural problems.
///
/// The template is parsed with `options`, so depth limits from the
/// configuration are reported as errors here too.
pub fn validate_descriptor(descriptor: &TemplateDescriptor, options: ParseOptions) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_variables(descriptor, &mut report);
    check_sections(descriptor, &mut report);
    check_malformed_markers(&descriptor.template, &mut report);

    match parse_with_options(&descriptor.template, options) {
        Ok(ast) => {
            let refs = ast.references();
            check_references(descriptor, &refs, &mut report);
        }
        Err(e) => report.error(format!("Template does not parse: {e}")),
    }

    tracing::debug!(
        "Validation finished with {} error(s) and {} warning(s)",
        report.errors.len(),
        report.warnings.len()
    );
    report
}

fn check_variables(descriptor: &TemplateDescriptor, report: &mut ValidationReport) {
    let mut seen = HashSet::new();

    for variable in &descriptor.variables {
        let name = &variable.name;
        if !seen.insert(name.as_str()) {
            report.error(format!("Variable '{name}' is declared more than once"));
        }
        if !is_identifier(name) {
            report.error(format!(
                "Variable name '{name}' is not a valid identifier (letters, digits and '_', not starting with a digit)"
            ));
        }
        if name == THIS_NAME {
            report.warning(format!(
                "Variable '{THIS_NAME}' is shadowed by the current element inside {{{{#each}}}} blocks"
            ));
        }

        if variable.var_type == VariableType::Select && variable.options.is_empty() {
            report.error(format!("Select variable '{name}' has no options"));
        }
        if variable.var_type != VariableType::Select && !variable.options.is_empty() {
            report.warning(format!(
                "Variable '{name}' has options but is of type {}; options are only used by select",
                variable.var_type
            ));
        }

        if let Some(default) = &variable.default_value {
            if !variable.var_type.accepts(default) {
                report.error(format!(
                    "Default value of '{name}' is a {} but the variable is of type {}",
                    default.type_name(),
                    variable.var_type
                ));
            } else if let (VariableType::Select, Value::Text(choice)) = (variable.var_type, default) {
                if !variable.options.is_empty() && !variable.options.contains(choice) {
                    report.error(format!(
                        "Default value '{choice}' of '{name}' is not one of its options"
                    ));
                }
            }
        }
    }
}

fn check_sections(descriptor: &TemplateDescriptor, report: &mut ValidationReport) {
    let mut seen = HashSet::new();

    for section in &descriptor.conditional_sections {
        if section.id.trim().is_empty() {
            report.error(format!("Conditional section '{}' has an empty id", section.name));
        } else if !seen.insert(section.id.as_str()) {
            report.error(format!("Conditional section id '{}' is used more than once", section.id));
        }
        if !is_identifier(&section.condition) {
            report.error(format!(
                "Condition '{}' of section '{}' must be a single name, not an expression",
                section.condition, section.id
            ));
        }
    }
}

fn check_malformed_markers(template: &str, report: &mut ValidationReport) {
    for token in tokenize(template) {
        let TokenKind::Text(text) = token.kind else {
            continue;
        };
        for found in malformed_marker_regex().find_iter(text) {
            let line = token.position.line + text[..found.start()].matches('\n').count();
            report.warning(format!(
                "'{}' on line {line} is not a recognized marker and renders as literal text",
                found.as_str()
            ));
        }
    }
}

fn check_references(
    descriptor: &TemplateDescriptor,
    refs: &crate::templating::References,
    report: &mut ValidationReport,
) {
    let declared: Vec<String> = descriptor.declared_names().into_iter().map(String::from).collect();

    for name in refs.all_names() {
        if declared.iter().any(|d| d == name) {
            continue;
        }
        if name == THIS_NAME || name == INDEX_NAME {
            report.warning(format!(
                "'{name}' is used outside {{{{#each}}}} and only resolves if supplied in the context"
            ));
            continue;
        }

        let mut message = format!("Template references '{name}' which is not declared");
        let similar = find_similar_names(name, &declared);
        if !similar.is_empty() {
            message.push_str(&format!(" (did you mean {}?)", quote_list(&similar)));
        }
        report.warning(message);
    }

    for source in &refs.sources {
        if let Some(variable) = descriptor.variable(source) {
            report.warning(format!(
                "'{source}' is iterated with {{{{#each}}}} but declared as {}; only lists produce output",
                variable.var_type
            ));
        }
    }

    let used = refs.all_names();
    for variable in &descriptor.variables {
        if !used.contains(&variable.name.as_str()) {
            report.warning(format!("Variable '{}' is declared but never used", variable.name));
        }
    }
    for section in &descriptor.conditional_sections {
        if !refs.conditions.contains(&section.condition) {
            report.warning(format!(
                "Section '{}' tests '{}' but the template has no {{{{#if {}}}}}",
                section.id, section.condition, section.condition
            ));
        }
    }
}

/// Up to three declared names close to `target`, closest first.
fn find_similar_names(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> =
        available.iter().map(|name| (name.clone(), levenshtein(target, name))).collect();

    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(name, _)| name)
        .collect()
}

fn quote_list(names: &[String]) -> String {
    names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ")
}
