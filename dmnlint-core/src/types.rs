use serde::{Deserialize, Serialize};
use std::fmt;

// ===== ISSUE MODEL =====
// Every check reports through these types. Issues are plain values: checks
// build their own lists and the processor concatenates them.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    pub element_id: Option<String>,
    pub element_name: Option<String>,
}

impl ValidationIssue {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            element_id: None,
            element_name: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Attach the offending element. Empty strings are stored as `None`.
    pub fn with_element(mut self, id: Option<&str>, name: Option<&str>) -> Self {
        self.element_id = non_empty(id);
        self.element_name = non_empty(name);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Outcome for one source document.
///
/// `is_valid` is never set directly by a check. It is derived once from the
/// final issue list: a document is valid when it parsed without a fatal
/// structural error and no issue has severity ERROR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub name: String,
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_issues(name: &str, issues: Vec<ValidationIssue>, structurally_sound: bool) -> Self {
        let is_valid = structurally_sound && !issues.iter().any(ValidationIssue::is_error);
        Self {
            name: name.to_string(),
            is_valid,
            issues,
        }
    }

    /// A result carrying a single ERROR, used when a document could not be analyzed at all.
    pub fn failed(name: &str, message: impl Into<String>) -> Self {
        Self::from_issues(name, vec![ValidationIssue::error(message)], false)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

// ===== DECISION TABLE MODEL =====

pub const DEFAULT_HIT_POLICY: &str = "UNIQUE";

/// An entry equal to the empty string or `-` matches any input.
pub fn is_wildcard(entry: &str) -> bool {
    let trimmed = entry.trim();
    trimmed.is_empty() || trimmed == "-"
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub type_ref: Option<String>,
}

impl Column {
    pub fn typed(type_ref: &str) -> Self {
        Self {
            type_ref: Some(type_ref.to_string()),
        }
    }

    pub fn untyped() -> Self {
        Self { type_ref: None }
    }

    /// Declared type, if present and not blank.
    pub fn declared_type(&self) -> Option<&str> {
        self.type_ref
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: Option<String>,
    pub original_index: usize, // 0-based position within the table
    pub input_entries: Vec<String>,
    pub output_entries: Vec<String>,
}

impl Rule {
    pub fn new(original_index: usize, input_entries: Vec<String>, output_entries: Vec<String>) -> Self {
        Self {
            id: None,
            original_index,
            input_entries,
            output_entries,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    fn present_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// "Rule 3 (ID: r3)" or "Rule 3", using the 1-based display index.
    pub fn display_label(&self) -> String {
        match self.present_id() {
            Some(id) => format!("Rule {} (ID: {})", self.original_index + 1, id),
            None => format!("Rule {}", self.original_index + 1),
        }
    }

    /// The rule id, or `UnnamedRule<index>` when the document gave none.
    pub fn id_or_synthesized(&self) -> String {
        match self.present_id() {
            Some(id) => id.to_string(),
            None => format!("UnnamedRule{}", self.original_index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTable {
    pub id: String,
    pub hit_policy: String,
    pub input_columns: Vec<Column>,
    pub output_columns: Vec<Column>,
    pub rules: Vec<Rule>,
}

impl DecisionTable {
    /// Build a table, synthesizing `UnnamedTable<index>` for a blank id and
    /// defaulting a blank hit policy to UNIQUE.
    pub fn new(index: usize, id: &str, hit_policy: &str) -> Self {
        let id = id.trim();
        let hit_policy = hit_policy.trim();
        Self {
            id: if id.is_empty() {
                format!("UnnamedTable{index}")
            } else {
                id.to_string()
            },
            hit_policy: if hit_policy.is_empty() {
                DEFAULT_HIT_POLICY.to_string()
            } else {
                hit_policy.to_string()
            },
            input_columns: Vec::new(),
            output_columns: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn policy(&self) -> HitPolicy {
        HitPolicy::parse(&self.hit_policy)
    }
}

/// Declared reconciliation strategy of a table. Only UNIQUE and ANY are
/// judged by the hit policy check; the rest are reported for manual review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitPolicy {
    Unique,
    Any,
    First,
    Priority,
    Collect,
    RuleOrder,
    OutputOrder,
    Other(String),
}

impl HitPolicy {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_uppercase().replace('_', " ").as_str() {
            "" | "UNIQUE" => HitPolicy::Unique,
            "ANY" => HitPolicy::Any,
            "FIRST" => HitPolicy::First,
            "PRIORITY" => HitPolicy::Priority,
            "COLLECT" => HitPolicy::Collect,
            "RULE ORDER" => HitPolicy::RuleOrder,
            "OUTPUT ORDER" => HitPolicy::OutputOrder,
            _ => HitPolicy::Other(trimmed.to_string()),
        }
    }

    /// Whether overlaps under this policy are judged rather than deferred to a reviewer.
    pub fn is_modelled(&self) -> bool {
        matches!(self, HitPolicy::Unique | HitPolicy::Any)
    }
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitPolicy::Unique => f.write_str("UNIQUE"),
            HitPolicy::Any => f.write_str("ANY"),
            HitPolicy::First => f.write_str("FIRST"),
            HitPolicy::Priority => f.write_str("PRIORITY"),
            HitPolicy::Collect => f.write_str("COLLECT"),
            HitPolicy::RuleOrder => f.write_str("RULE ORDER"),
            HitPolicy::OutputOrder => f.write_str("OUTPUT ORDER"),
            HitPolicy::Other(raw) => f.write_str(raw),
        }
    }
}

// ===== DOCUMENT MODEL =====
// Produced once by the extractor; checks only ever borrow it.

/// A DRG element (or the definitions root) that is expected to carry documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentedElement {
    pub kind: String, // local element name, e.g. "decision"
    pub id: String,
    pub name: String,
    /// Text of the documentation child; `None` when there is no such child.
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub name: String,
    pub type_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmnDocument {
    pub root_name: String,
    pub definitions: Option<DocumentedElement>,
    pub tables: Vec<DecisionTable>,
    pub elements: Vec<DocumentedElement>,
    pub item_definitions: Vec<ItemDefinition>,
}

/// Raw bytes of one document in a batch, as handed over by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        assert!(is_wildcard(""));
        assert!(is_wildcard("  "));
        assert!(is_wildcard("-"));
        assert!(is_wildcard(" - "));
        assert!(!is_wildcard("--"));
        assert!(!is_wildcard("\"-\""));
    }

    #[test]
    fn test_table_defaults() {
        let table = DecisionTable::new(3, "  ", "");
        assert_eq!(table.id, "UnnamedTable3");
        assert_eq!(table.hit_policy, "UNIQUE");
        assert_eq!(table.policy(), HitPolicy::Unique);
    }

    #[test]
    fn test_hit_policy_parsing() {
        assert_eq!(HitPolicy::parse("any"), HitPolicy::Any);
        assert_eq!(HitPolicy::parse(" First "), HitPolicy::First);
        assert_eq!(HitPolicy::parse("RULE ORDER"), HitPolicy::RuleOrder);
        assert_eq!(HitPolicy::parse("output_order"), HitPolicy::OutputOrder);
        assert_eq!(HitPolicy::parse("Sometimes"), HitPolicy::Other("Sometimes".to_string()));
        assert_eq!(HitPolicy::parse("collect").to_string(), "COLLECT");
        assert!(!HitPolicy::Priority.is_modelled());
    }

    #[test]
    fn test_rule_labels() {
        let named = Rule::new(0, vec![], vec![]).with_id("r1");
        let unnamed = Rule::new(4, vec![], vec![]);
        assert_eq!(named.display_label(), "Rule 1 (ID: r1)");
        assert_eq!(unnamed.display_label(), "Rule 5");
        assert_eq!(unnamed.id_or_synthesized(), "UnnamedRule4");
    }

    #[test]
    fn test_validity_is_derived_from_errors() {
        let warnings_only = ValidationResult::from_issues(
            "a.dmn",
            vec![ValidationIssue::warning("w"), ValidationIssue::info("i")],
            true,
        );
        assert!(warnings_only.is_valid);

        let with_error = ValidationResult::from_issues("a.dmn", vec![ValidationIssue::error("e")], true);
        assert!(!with_error.is_valid);

        let unsound = ValidationResult::from_issues("a.dmn", vec![], false);
        assert!(!unsound.is_valid);
    }

    #[test]
    fn test_issue_serializes_with_camel_case_keys() {
        let issue = ValidationIssue::warning("missing").with_element(Some("d1"), Some(""));
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "WARNING");
        assert_eq!(json["elementId"], "d1");
        assert!(json["elementName"].is_null());
    }
}
