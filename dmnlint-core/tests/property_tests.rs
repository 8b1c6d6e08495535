//! Property tests for overlap detection and whole-document validation.

use dmnlint_core::rules::overlap::might_overlap;
use dmnlint_core::rules::rule_gap::parse_numeric_interval;
use dmnlint_core::{DocumentProcessor, Rule};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// Non-wildcard entry text: quoted strings, numbers and ranges.
fn concrete_entry() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|s| format!("\"{s}\"")),
        (0u32..1000).prop_map(|n| n.to_string()),
        (0u32..100, 0u32..100).prop_map(|(a, b)| format!("[{a}..{b}]")),
    ]
}

fn entry() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => concrete_entry(),
        1 => Just("-".to_string()),
        1 => Just(String::new()),
    ]
}

fn rule(index: usize, inputs: Vec<String>) -> Rule {
    Rule::new(index, inputs, vec!["\"out\"".to_string()])
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('"', "&quot;")
}

fn table_xml(policy: &str, rows: &[Vec<String>]) -> String {
    let columns = rows.first().map(Vec::len).unwrap_or(0);
    let mut xml = format!(
        "<definitions id=\"p\"><decision id=\"d\" name=\"D\"><decisionTable id=\"t\" hitPolicy=\"{policy}\">"
    );
    for _ in 0..columns {
        xml.push_str("<input><inputExpression/></input>");
    }
    xml.push_str("<output/>");
    for (i, row) in rows.iter().enumerate() {
        xml.push_str(&format!("<rule id=\"r{i}\">"));
        for cell in row {
            xml.push_str(&format!("<inputEntry><text>{}</text></inputEntry>", xml_escape(cell)));
        }
        xml.push_str(&format!("<outputEntry><text>{i}</text></outputEntry></rule>"));
    }
    xml.push_str("</decisionTable></decision></definitions>");
    xml
}

// ============================================================================
// Overlap properties
// ============================================================================

proptest! {
    #[test]
    fn identical_entries_always_overlap(inputs in prop::collection::vec(entry(), 1..6)) {
        prop_assert!(might_overlap(&rule(0, inputs.clone()), &rule(1, inputs)));
    }

    #[test]
    fn overlap_is_symmetric(
        a in prop::collection::vec(entry(), 3),
        b in prop::collection::vec(entry(), 3),
    ) {
        let (x, y) = (rule(0, a), rule(1, b));
        prop_assert_eq!(might_overlap(&x, &y), might_overlap(&y, &x));
    }

    #[test]
    fn wildcard_rule_overlaps_everything(other in prop::collection::vec(entry(), 1..6)) {
        let wildcards = vec!["-".to_string(); other.len()];
        prop_assert!(might_overlap(&rule(0, wildcards), &rule(1, other)));
    }

    #[test]
    fn one_differing_concrete_column_prevents_overlap(
        shared in prop::collection::vec(entry(), 0..4),
        left in concrete_entry(),
        right in concrete_entry(),
    ) {
        prop_assume!(left.trim() != right.trim());
        let mut a = shared.clone();
        a.push(left);
        let mut b = shared;
        b.push(right);
        prop_assert!(!might_overlap(&rule(0, a), &rule(1, b)));
    }

    #[test]
    fn different_arity_never_overlaps(
        a in prop::collection::vec(entry(), 1..4),
        extra in entry(),
    ) {
        let mut b = a.clone();
        b.push(extra);
        prop_assert!(!might_overlap(&rule(0, a), &rule(1, b)));
    }

    #[test]
    fn interval_bounds_survive_parsing(lower in -1.0e6f64..1.0e6, upper in -1.0e6f64..1.0e6) {
        let parsed = parse_numeric_interval(&format!("[{lower}..{upper}]"));
        prop_assert_eq!(parsed.map(|i| (i.lower, i.upper)), Some((lower, upper)));
    }
}

// ============================================================================
// Whole-document properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn validation_is_deterministic(
        policy in prop::sample::select(vec!["UNIQUE", "ANY", "FIRST", "COLLECT"]),
        rows in prop::collection::vec(prop::collection::vec(entry(), 2), 0..8),
    ) {
        let xml = table_xml(policy, &rows);
        let processor = DocumentProcessor::default();
        let first = processor.validate_document("gen.dmn", xml.as_bytes());
        let second = processor.validate_document("gen.dmn", xml.as_bytes());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn validity_matches_absence_of_errors(
        policy in prop::sample::select(vec!["UNIQUE", "ANY", "PRIORITY"]),
        rows in prop::collection::vec(prop::collection::vec(entry(), 1..3), 0..6),
    ) {
        // ragged rows are fine: rules of different arity simply never overlap
        let xml = table_xml(policy, &rows);
        let result = DocumentProcessor::default().validate_document("gen.dmn", xml.as_bytes());
        prop_assert_eq!(result.is_valid, !result.issues.iter().any(|i| i.is_error()));
    }

    #[test]
    fn unique_errors_match_overlapping_pairs(
        rows in prop::collection::vec(prop::collection::vec(entry(), 2), 0..8),
    ) {
        let rules: Vec<Rule> = rows.iter().cloned().enumerate().map(|(i, r)| rule(i, r)).collect();
        let mut expected = 0;
        for i in 0..rules.len() {
            for j in i + 1..rules.len() {
                if might_overlap(&rules[i], &rules[j]) {
                    expected += 1;
                }
            }
        }
        let xml = table_xml("UNIQUE", &rows);
        let result = DocumentProcessor::default().validate_document("gen.dmn", xml.as_bytes());
        let errors = result.issues.iter().filter(|i| i.is_error()).count();
        prop_assert_eq!(errors, expected);
    }
}
