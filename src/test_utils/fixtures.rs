//! Sample descriptor files for tests.
//!
//! The `lesson_*` fixtures describe the same lesson in each supported format,
//! so they render identically for the same inputs.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Template shared by the `lesson_*` fixtures.
pub const LESSON_TEMPLATE: &str = "# {{topic}} for {{className}}\n{{#if includeLab}}Lab: bring goggles\n{{/if}}{{#each steps}}{{@index}}. {{this}}\n{{/each}}Duration: {{minutes}} min\n";

/// A descriptor file's name and content.
#[derive(Clone, Debug)]
pub struct DescriptorFixture {
    pub file_name: String,
    pub content: String,
}

impl DescriptorFixture {
    pub fn new(file_name: &str, content: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            content: content.to_string(),
        }
    }

    /// The lesson as TOML
    pub fn lesson_toml() -> Self {
        let content = format!(
            r#"name = "Photosynthesis"
template = {template:?}

[[variables]]
name = "topic"
type = "text"
label = "Topic"
required = true

[[variables]]
name = "className"
type = "text"
defaultValue = "Class 4B"

[[variables]]
name = "minutes"
type = "number"
defaultValue = 45

[[variables]]
name = "includeLab"
type = "boolean"

[[conditionalSections]]
id = "lab"
name = "Lab work"
condition = "includeLab"

[customPrompts]
objectives = "List three learning objectives"

[metadata]
author = "Science dept"
tags = ["biology", "plants"]
estimatedTime = 45
"#,
            template = LESSON_TEMPLATE
        );
        Self::new("lesson.toml", &content)
    }

    /// The lesson as YAML
    pub fn lesson_yaml() -> Self {
        let content = format!(
            r#"name: Photosynthesis
template: {template:?}
variables:
  - name: topic
    type: text
    label: Topic
    required: true
  - name: className
    type: text
    defaultValue: Class 4B
  - name: minutes
    type: number
    defaultValue: 45
  - name: includeLab
    type: boolean
conditionalSections:
  - id: lab
    name: Lab work
    condition: includeLab
customPrompts:
  objectives: List three learning objectives
metadata:
  author: Science dept
  tags: [biology, plants]
  estimatedTime: 45
"#,
            template = LESSON_TEMPLATE
        );
        Self::new("lesson.yaml", &content)
    }

    /// The lesson as JSON
    pub fn lesson_json() -> Self {
        let content = serde_json::json!({
            "name": "Photosynthesis",
            "template": LESSON_TEMPLATE,
            "variables": [
                { "name": "topic", "type": "text", "label": "Topic", "required": true },
                { "name": "className", "type": "text", "defaultValue": "Class 4B" },
                { "name": "minutes", "type": "number", "defaultValue": 45 },
                { "name": "includeLab", "type": "boolean" }
            ],
            "conditionalSections": [
                { "id": "lab", "name": "Lab work", "condition": "includeLab" }
            ],
            "customPrompts": { "objectives": "List three learning objectives" },
            "metadata": {
                "author": "Science dept",
                "tags": ["biology", "plants"],
                "estimatedTime": 45
            }
        });
        Self::new("lesson.json", &content.to_string())
    }

    /// The lesson as Markdown with YAML frontmatter
    pub fn lesson_markdown() -> Self {
        let content = format!(
            r#"---
name: Photosynthesis
variables:
  - name: topic
    type: text
    label: Topic
    required: true
  - name: className
    type: text
    defaultValue: Class 4B
  - name: minutes
    type: number
    defaultValue: 45
  - name: includeLab
    type: boolean
conditionalSections:
  - id: lab
    name: Lab work
    condition: includeLab
customPrompts:
  objectives: List three learning objectives
metadata:
  author: Science dept
  tags: [biology, plants]
  estimatedTime: 45
---
{LESSON_TEMPLATE}"#
        );
        Self::new("lesson.md", &content)
    }

    /// A descriptor whose template never closes its `{{#each}}`
    pub fn unbalanced() -> Self {
        Self::new(
            "unbalanced.toml",
            r#"name = "Broken"
template = "Steps:\n{{#each steps}}\n- {{this}}\n"
"#,
        )
    }

    /// A descriptor with structural errors in its declarations
    pub fn invalid_declarations() -> Self {
        Self::new(
            "invalid.yaml",
            r#"name: Quiz
template: "{{level}} {{level}}"
variables:
  - name: level
    type: select
  - name: level
    type: text
"#,
        )
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write fixture {}", path.display()))?;
        Ok(path)
    }
}
