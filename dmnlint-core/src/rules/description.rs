use super::engine::{CheckContext, DocumentCheck};
use crate::config::DescriptionConfig;
use crate::types::*;
use anyhow::Result;

pub struct DescriptionCheck {
    element_kinds: Vec<String>,
    check_definitions: bool,
}

impl DescriptionCheck {
    pub fn new(config: &DescriptionConfig) -> Self {
        Self {
            element_kinds: config.element_kinds.clone(),
            check_definitions: config.check_definitions,
        }
    }

    fn check_element(element: &DocumentedElement, file_name: &str) -> Option<ValidationIssue> {
        let problem = match element.description.as_deref() {
            None => "is missing a description",
            Some(text) if text.trim().is_empty() => "has an empty description",
            Some(_) => return None,
        };
        Some(
            ValidationIssue::warning(format!(
                "DMN Element '{}' (ID: {}, Name: '{}') in file '{}' {}.",
                element.kind, element.id, element.name, file_name, problem
            ))
            .with_element(Some(element.id.as_str()), Some(element.name.as_str())),
        )
    }
}

impl DocumentCheck for DescriptionCheck {
    fn apply(&self, ctx: &CheckContext<'_>) -> Result<Vec<ValidationIssue>> {
        let document = ctx.document;
        let mut issues = Vec::new();

        if self.check_definitions {
            if let Some(definitions) = &document.definitions {
                issues.extend(Self::check_element(definitions, ctx.file_name));
            }
        }

        for kind in &self.element_kinds {
            issues.extend(
                document
                    .elements
                    .iter()
                    .filter(|element| element.kind == *kind)
                    .filter_map(|element| Self::check_element(element, ctx.file_name)),
            );
        }
        Ok(issues)
    }

    fn name(&self) -> &str {
        "Description"
    }
}
