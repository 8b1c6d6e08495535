//! End-to-end validation tests over the DMN files in `test_fixtures/`.
//!
//! Each fixture isolates one kind of defect, so every test can assert the
//! exact issue counts for its file: anything extra is a regression in one of
//! the other checks.

use dmnlint_core::{
    CheckKind, DocumentProcessor, GatingPolicy, Severity, SourceDocument, ValidationConfig,
    ValidationResult,
};
use std::path::PathBuf;

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn load_fixture(name: &str) -> Vec<u8> {
    let path = fixtures_dir().join(name);
    std::fs::read(&path).unwrap_or_else(|_| panic!("Missing fixture: {}", path.display()))
}

fn validate_with(config: ValidationConfig, name: &str) -> ValidationResult {
    DocumentProcessor::new(config).validate_document(name, &load_fixture(name))
}

fn validate(name: &str) -> ValidationResult {
    validate_with(ValidationConfig::default(), name)
}

fn messages(result: &ValidationResult, severity: Severity) -> Vec<&str> {
    result
        .issues
        .iter()
        .filter(|i| i.severity == severity)
        .map(|i| i.message.as_str())
        .collect()
}

// ============================================================================
// Structure: well-formedness and namespace handling
// ============================================================================

mod structure {
    use super::*;

    #[test]
    fn clean_document_only_reports_well_formedness() {
        let result = validate("clean.dmn");
        assert!(result.is_valid);
        assert_eq!(result.issues.len(), 1, "{:?}", result.issues);
        assert_eq!(result.issues[0].severity, Severity::Info);
        assert_eq!(result.issues[0].message, "XML is well-formed for clean.dmn.");
    }

    #[test]
    fn malformed_document_yields_single_parse_error() {
        let result = validate("malformed.dmn");
        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Error);
        assert!(result.issues[0].message.starts_with("XML parsing error in malformed.dmn:"));
    }

    #[test]
    fn prefixed_and_default_namespace_documents_agree() {
        let prefixed = validate("namespaced.dmn");
        let default_ns = validate("unique_overlap.dmn");

        assert_eq!(prefixed.is_valid, default_ns.is_valid);
        assert_eq!(messages(&prefixed, Severity::Error).len(), 1);
        assert_eq!(
            messages(&prefixed, Severity::Error)[0].replace("namespaced.dmn", "X"),
            messages(&default_ns, Severity::Error)[0].replace("unique_overlap.dmn", "X")
        );
    }
}

// ============================================================================
// Hit policies
// ============================================================================

mod hit_policies {
    use super::*;

    #[test]
    fn unique_overlap_invalidates_document() {
        let result = validate("unique_overlap.dmn");
        assert!(!result.is_valid);
        assert_eq!(
            messages(&result, Severity::Error),
            vec![
                "Rule 1 (ID: r1) and Rule 2 (ID: r2) in table 'carrierTable' (file: unique_overlap.dmn) overlap, which violates UNIQUE hit policy."
            ]
        );
        assert!(messages(&result, Severity::Warning).is_empty());
    }

    #[test]
    fn any_policy_only_rejects_disagreeing_outputs() {
        let result = validate("any_policy.dmn");
        assert!(!result.is_valid);
        let errors = messages(&result, Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'disagreeingTable'"));
        assert!(errors[0].contains("violates ANY hit policy"));
    }

    #[test]
    fn first_policy_overlap_is_informational() {
        let result = validate("first_policy.dmn");
        assert!(result.is_valid);
        let infos = messages(&result, Severity::Info);
        assert_eq!(infos.len(), 2);
        assert!(infos[1].contains("Hit policy 'FIRST' is not explicitly validated, manual review recommended"));
    }

    #[test]
    fn oversized_tables_are_not_scanned() {
        let mut config = ValidationConfig::default();
        config.overlap.max_rules = 2;
        let result = DocumentProcessor::new(config)
            .validate_document("gaps.dmn", &load_fixture("rule_gaps.dmn"));
        assert!(result.is_valid);
        assert!(result
            .issues
            .iter()
            .any(|i| i.message.contains("table too large for exhaustive overlap analysis")));
    }
}

// ============================================================================
// Type consistency, gaps and descriptions
// ============================================================================

mod findings {
    use super::*;

    #[test]
    fn quoted_literals_in_typed_columns_are_warned() {
        let result = validate("type_mismatch.dmn");
        assert!(result.is_valid);
        let warnings: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].element_id.as_deref(), Some("quotedNumber"));
        assert_eq!(warnings[0].element_name.as_deref(), Some("Input Entry 1"));
        assert!(warnings[0].message.contains("expected type 'number' but found literal '\"123\"'"));
        assert_eq!(warnings[1].element_id.as_deref(), Some("quotedBoolean"));
        assert_eq!(warnings[1].element_name.as_deref(), Some("Input Entry 2"));
    }

    #[test]
    fn numeric_gap_is_reported_once() {
        let result = validate("rule_gaps.dmn");
        assert!(result.is_valid);
        assert_eq!(
            messages(&result, Severity::Warning),
            vec!["Potential rule gap detected between 5 and 10 in table 'bandTable' (file: rule_gaps.dmn)."]
        );
    }

    #[test]
    fn missing_and_blank_descriptions_are_warned() {
        let result = validate("missing_descriptions.dmn");
        assert!(result.is_valid);
        let warnings = messages(&result, Severity::Warning);
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert!(warnings[0].starts_with("DMN Element 'definitions' (ID: undocumented"));
        assert_eq!(
            warnings[1],
            "DMN Element 'decision' (ID: risk, Name: 'Risk') in file 'missing_descriptions.dmn' is missing a description."
        );
        assert!(warnings[2].contains("'inputData' (ID: income") && warnings[2].ends_with("has an empty description."));
    }

    #[test]
    fn configured_element_kinds_replace_the_defaults() {
        let mut config = ValidationConfig::default();
        config.description.element_kinds = vec!["knowledgeSource".to_string()];
        let result = validate_with(config, "missing_descriptions.dmn");
        let warnings = messages(&result, Severity::Warning);
        assert_eq!(warnings.len(), 2, "{warnings:?}");
        assert!(warnings[0].starts_with("DMN Element 'definitions'"));
        assert!(warnings[1].starts_with("DMN Element 'knowledgeSource' (ID: policyDoc, Name: 'Policy Document')"));
    }

    #[test]
    fn decision_tables_can_be_required_to_carry_descriptions() {
        let mut config = ValidationConfig::default();
        config.description.element_kinds = vec!["decisionTable".to_string()];
        let result = validate_with(config, "unique_overlap.dmn");
        assert_eq!(
            messages(&result, Severity::Warning),
            vec!["DMN Element 'decisionTable' (ID: carrierTable, Name: '') in file 'unique_overlap.dmn' is missing a description."]
        );
    }

    #[test]
    fn item_definition_cycle_is_contained_to_its_check() {
        let result = validate("item_definition_cycle.dmn");
        assert!(!result.is_valid);
        let errors = messages(&result, Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error during type consistency analysis for item_definition_cycle.dmn:"));
    }
}

// ============================================================================
// Aggregation, gating and batches
// ============================================================================

mod aggregation {
    use super::*;

    #[test]
    fn issues_follow_canonical_check_order() {
        // overlap error, then description warning, then type warning, then gap warning
        let xml = r#"<definitions id="mixed">
  <decision id="d" name="D">
    <decisionTable id="t">
      <input><inputExpression/></input>
      <input><inputExpression typeRef="number"/></input>
      <output/>
      <rule id="a"><inputEntry><text>[1..2]</text></inputEntry><inputEntry><text>"x"</text></inputEntry><outputEntry><text>1</text></outputEntry></rule>
      <rule id="b"><inputEntry><text>[1..2]</text></inputEntry><inputEntry><text>-</text></inputEntry><outputEntry><text>2</text></outputEntry></rule>
      <rule id="c"><inputEntry><text>[5..6]</text></inputEntry><inputEntry><text>-</text></inputEntry><outputEntry><text>3</text></outputEntry></rule>
    </decisionTable>
  </decision>
</definitions>"#;
        let result = DocumentProcessor::default().validate_document("mixed.dmn", xml.as_bytes());
        let kinds: Vec<(Severity, &str)> = result
            .issues
            .iter()
            .map(|i| {
                let tag = if i.message.starts_with("XML is well-formed") {
                    "syntax"
                } else if i.message.contains("hit policy") {
                    "overlap"
                } else if i.message.starts_with("DMN Element") {
                    "description"
                } else if i.message.starts_with("Type inconsistency") {
                    "type"
                } else {
                    "gap"
                };
                (i.severity, tag)
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (Severity::Info, "syntax"),
                (Severity::Error, "overlap"),
                (Severity::Warning, "description"),
                (Severity::Warning, "description"),
                (Severity::Warning, "type"),
                (Severity::Warning, "gap"),
            ]
        );
    }

    #[test]
    fn stop_on_error_skips_later_checks() {
        let config = ValidationConfig {
            gating: GatingPolicy::StopOnError,
            ..Default::default()
        };
        let result = validate_with(config, "unique_overlap.dmn");
        assert!(!result.is_valid);
        let last = result.issues.last().map(|i| i.message.as_str()).unwrap_or_default();
        assert!(last.contains("[Description, TypeConsistency, RuleGap]"), "{last}");
    }

    #[test]
    fn independent_gating_runs_every_check() {
        let result = validate("item_definition_cycle.dmn");
        // the type check failed but the hit policy and gap checks still ran without findings
        assert_eq!(messages(&result, Severity::Error).len(), 1);
        assert_eq!(
            dmnlint_core::CheckEngine::new(&ValidationConfig::default()).enabled_checks(),
            CheckKind::ALL.to_vec()
        );
    }

    #[test]
    fn disabled_checks_report_nothing() {
        let config = ValidationConfig::from_yaml(
            "pipeline:\n  checks:\n    - name: HitPolicy\n      enabled: false\n    - name: RuleGap\n",
        )
        .unwrap();
        let result = validate_with(config, "unique_overlap.dmn");
        assert!(result.is_valid);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn batch_isolates_failures_and_keeps_order() {
        let names = [
            "clean.dmn",
            "malformed.dmn",
            "unique_overlap.dmn",
            "rule_gaps.dmn",
        ];
        let sources: Vec<SourceDocument> = names
            .iter()
            .map(|n| SourceDocument::new(*n, load_fixture(n)))
            .collect();
        let results = DocumentProcessor::default().validate_batch(&sources);

        let got: Vec<(&str, bool)> = results.iter().map(|r| (r.name.as_str(), r.is_valid)).collect();
        assert_eq!(
            got,
            vec![
                ("clean.dmn", true),
                ("malformed.dmn", false),
                ("unique_overlap.dmn", false),
                ("rule_gaps.dmn", true),
            ]
        );
    }

    #[test]
    fn validation_is_repeatable() {
        let processor = DocumentProcessor::default();
        let bytes = load_fixture("any_policy.dmn");
        let first = processor.validate_document("any_policy.dmn", &bytes);
        let second = processor.validate_document("any_policy.dmn", &bytes);
        assert_eq!(first, second);
    }
}
