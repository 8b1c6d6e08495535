//! DMN Extractor
//!
//! Reads decision tables, DRG elements and item definitions out of a DMN
//! definitions document. All lookups are by local name, so prefixed,
//! default-namespaced and unqualified documents extract identically.

pub mod xml_tree;

use crate::config::DescriptionConfig;
use crate::error::ExtractError;
use crate::extractors::traits::Extractor;
use crate::types::*;
use tracing::debug;
use xml_tree::XmlElement;

pub const DEFINITIONS: &str = "definitions";

/// DMN extractor
///
/// `element_kinds` lists the local names recorded as documented elements, and
/// `documentation_tags` the child element names that count as an element's
/// description (normally just `description`).
pub struct DmnExtractor {
    element_kinds: Vec<String>,
    documentation_tags: Vec<String>,
}

impl DmnExtractor {
    pub fn new(element_kinds: Vec<String>, documentation_tags: Vec<String>) -> Self {
        Self {
            element_kinds,
            documentation_tags,
        }
    }

    /// Record exactly the kinds and tags the description check is configured for.
    pub fn from_config(config: &DescriptionConfig) -> Self {
        Self::new(config.element_kinds.clone(), config.tags.clone())
    }

    fn records(&self, element: &XmlElement) -> bool {
        // the definitions root is reported on its own
        element.name != DEFINITIONS && self.element_kinds.iter().any(|kind| *kind == element.name)
    }

    fn documented(&self, element: &XmlElement) -> DocumentedElement {
        let description = element
            .elements()
            .find(|child| self.documentation_tags.iter().any(|tag| *tag == child.name))
            .map(XmlElement::text_content);
        DocumentedElement {
            kind: element.name.clone(),
            id: element.attribute("id").unwrap_or_default().to_string(),
            name: element.attribute("name").unwrap_or_default().to_string(),
            description,
        }
    }
}

impl Default for DmnExtractor {
    fn default() -> Self {
        Self::from_config(&DescriptionConfig::default())
    }
}

/// Text of an entry's `text` child, or "" when the entry has none.
fn entry_text(entry: &XmlElement) -> String {
    entry
        .child("text")
        .map(XmlElement::text_content)
        .unwrap_or_default()
}

fn read_rule(index: usize, rule: &XmlElement) -> Rule {
    let inputs = rule.children_named("inputEntry").map(entry_text).collect();
    let outputs = rule.children_named("outputEntry").map(entry_text).collect();
    let mut parsed = Rule::new(index, inputs, outputs);
    if let Some(id) = rule.attribute("id").filter(|id| !id.is_empty()) {
        parsed = parsed.with_id(id);
    }
    parsed
}

fn column_type(type_ref: Option<&str>) -> Column {
    match type_ref.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => Column::typed(t),
        None => Column::untyped(),
    }
}

fn read_table(index: usize, table: &XmlElement) -> DecisionTable {
    let mut parsed = DecisionTable::new(
        index,
        table.attribute("id").unwrap_or_default(),
        table.attribute("hitPolicy").unwrap_or_default(),
    );

    parsed.input_columns = table
        .children_named("input")
        .map(|input| {
            column_type(
                input
                    .child("inputExpression")
                    .and_then(|expr| expr.attribute("typeRef")),
            )
        })
        .collect();
    parsed.output_columns = table
        .children_named("output")
        .map(|output| column_type(output.attribute("typeRef")))
        .collect();
    parsed.rules = table
        .children_named("rule")
        .enumerate()
        .map(|(i, rule)| read_rule(i, rule))
        .collect();

    debug!(
        "Extracted table '{}' ({} inputs, {} outputs, {} rules, hit policy {})",
        parsed.id,
        parsed.input_columns.len(),
        parsed.output_columns.len(),
        parsed.rules.len(),
        parsed.hit_policy
    );
    parsed
}

fn read_item_definition(item: &XmlElement) -> ItemDefinition {
    // DMN 1.1+ uses a typeRef child; older files carry it as an attribute
    let type_ref = item
        .child("typeRef")
        .map(XmlElement::text_content)
        .or_else(|| item.attribute("typeRef").map(str::to_string))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    ItemDefinition {
        name: item.attribute("name").unwrap_or_default().to_string(),
        type_ref,
    }
}

impl Extractor for DmnExtractor {
    fn parse_markup(&self, bytes: &[u8]) -> Result<XmlElement, ExtractError> {
        xml_tree::parse(bytes)
    }

    fn build_document(&self, root: &XmlElement) -> DmnDocument {
        let descendants = root.descendants();

        let tables = descendants
            .iter()
            .filter(|e| e.name == "decisionTable")
            .enumerate()
            .map(|(i, table)| read_table(i, table))
            .collect();

        let elements = descendants
            .iter()
            .filter(|e| self.records(e))
            .map(|e| self.documented(e))
            .collect();

        let item_definitions = descendants
            .iter()
            .filter(|e| e.name == "itemDefinition")
            .map(|e| read_item_definition(e))
            .collect();

        let definitions = (root.name == DEFINITIONS).then(|| self.documented(root));

        DmnDocument {
            root_name: root.name.clone(),
            definitions,
            tables,
            elements,
            item_definitions,
        }
    }

    fn name(&self) -> &str {
        "DmnExtractor"
    }
}
