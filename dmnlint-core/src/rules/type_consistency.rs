use super::engine::{CheckContext, DocumentCheck};
use super::literal::{classify_literal, DeclaredType};
use crate::types::*;
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Follows typeRefs through the document's item definitions.
struct TypeResolver<'a> {
    definitions: HashMap<&'a str, Option<&'a str>>,
    enabled: bool,
}

impl<'a> TypeResolver<'a> {
    fn new(items: &'a [ItemDefinition], enabled: bool) -> Self {
        let definitions = items
            .iter()
            .filter(|item| !item.name.is_empty())
            .map(|item| (item.name.as_str(), item.type_ref.as_deref()))
            .collect();
        Self {
            definitions,
            enabled,
        }
    }

    /// The definition a typeRef names, trying the QName's local part second.
    fn lookup(&self, type_ref: &str) -> Option<Option<&'a str>> {
        if let Some(found) = self.definitions.get(type_ref) {
            return Some(*found);
        }
        let (_, local) = type_ref.split_once(':')?;
        self.definitions.get(local).copied()
    }

    fn resolve(&self, type_ref: &str) -> Result<DeclaredType> {
        let mut current = type_ref.trim().to_string();
        let mut visited: HashSet<String> = HashSet::new();
        loop {
            let declared = DeclaredType::parse(&current);
            if declared.is_builtin() || !self.enabled {
                return Ok(declared);
            }
            match self.lookup(&current) {
                Some(Some(next)) => {
                    if !visited.insert(current.clone()) {
                        bail!("item definition '{}' refers back to itself through its typeRef chain", current);
                    }
                    current = next.trim().to_string();
                }
                // structured definitions and unknown names are not checked
                _ => return Ok(declared),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Input,
    Output,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::Input => "Input",
            Side::Output => "Output",
        }
    }
}

/// Flags rule entries whose literal kind disagrees with their column's declared type.
pub struct TypeConsistencyCheck {
    resolve_item_definitions: bool,
}

impl TypeConsistencyCheck {
    pub fn new(resolve_item_definitions: bool) -> Self {
        Self {
            resolve_item_definitions,
        }
    }

    fn column_types(
        resolver: &TypeResolver<'_>,
        columns: &[Column],
    ) -> Result<Vec<Option<(String, DeclaredType)>>> {
        columns
            .iter()
            .map(|column| match column.declared_type() {
                Some(raw) => Ok(Some((raw.to_string(), resolver.resolve(raw)?))),
                None => Ok(None),
            })
            .collect()
    }

    fn check_entries(
        table: &DecisionTable,
        rule: &Rule,
        side: Side,
        entries: &[String],
        types: &[Option<(String, DeclaredType)>],
        file_name: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for (position, entry) in entries.iter().enumerate() {
            // entries past the declared columns have no type to check against
            let Some(Some((raw_type, declared))) = types.get(position) else {
                continue;
            };
            if is_wildcard(entry) || declared.accepts(classify_literal(entry)) {
                continue;
            }
            let rule_id = rule.id_or_synthesized();
            let entry_name = format!("{} Entry {}", side.label(), position + 1);
            issues.push(
                ValidationIssue::warning(format!(
                    "Type inconsistency in Table '{}', Rule '{}' (File: {}): {} expected type '{}' but found literal '{}' which appears to be of a different type.",
                    table.id,
                    rule_id,
                    file_name,
                    entry_name,
                    raw_type,
                    entry.trim()
                ))
                .with_element(Some(rule_id.as_str()), Some(entry_name.as_str())),
            );
        }
    }

    pub fn check_table(
        &self,
        table: &DecisionTable,
        item_definitions: &[ItemDefinition],
        file_name: &str,
    ) -> Result<Vec<ValidationIssue>> {
        let resolver = TypeResolver::new(item_definitions, self.resolve_item_definitions);
        let input_types = Self::column_types(&resolver, &table.input_columns)?;
        let output_types = Self::column_types(&resolver, &table.output_columns)?;

        let mut issues = Vec::new();
        for rule in &table.rules {
            Self::check_entries(table, rule, Side::Input, &rule.input_entries, &input_types, file_name, &mut issues);
            Self::check_entries(table, rule, Side::Output, &rule.output_entries, &output_types, file_name, &mut issues);
        }
        Ok(issues)
    }
}

impl DocumentCheck for TypeConsistencyCheck {
    /// A table whose column types cannot be resolved yields one ERROR; the
    /// other tables of the document are still checked.
    fn apply(&self, ctx: &CheckContext<'_>) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for table in &ctx.document.tables {
            match self.check_table(table, &ctx.document.item_definitions, ctx.file_name) {
                Ok(found) => issues.extend(found),
                Err(e) => {
                    warn!("Type resolution failed for table '{}' in {}: {:#}", table.id, ctx.file_name, e);
                    issues.push(
                        ValidationIssue::error(format!(
                            "Error during type consistency analysis for {}: table '{}': {:#}",
                            ctx.file_name, table.id, e
                        ))
                        .with_element(Some(table.id.as_str()), None),
                    );
                }
            }
        }
        Ok(issues)
    }

    fn name(&self) -> &str {
        "TypeConsistency"
    }
}
