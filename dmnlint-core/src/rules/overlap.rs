//! Pairwise rule overlap detection
//!
//! Overlap here is syntactic: two rules might match the same input when every
//! input column is either a wildcard on one side or textually equal on both.
//! Ranges and comparisons are not intersected.

use crate::types::{is_wildcard, DecisionTable, Rule};

/// Whether `a` and `b` might both match some input.
///
/// Rules with different input-entry counts are not comparable and never overlap.
pub fn might_overlap(a: &Rule, b: &Rule) -> bool {
    if a.input_entries.len() != b.input_entries.len() {
        return false;
    }
    a.input_entries
        .iter()
        .zip(&b.input_entries)
        .all(|(x, y)| is_wildcard(x) || is_wildcard(y) || x.trim() == y.trim())
}

/// Exact, element-wise equality of the output entries.
pub fn same_outputs(a: &Rule, b: &Rule) -> bool {
    a.output_entries == b.output_entries
}

/// Two rules of one table that might overlap, `first` preceding `second`.
#[derive(Debug, Clone, Copy)]
pub struct OverlapPair<'a> {
    pub first: &'a Rule,
    pub second: &'a Rule,
}

#[derive(Debug, Clone)]
pub enum OverlapScan<'a> {
    Pairs(Vec<OverlapPair<'a>>),
    /// The table exceeded the rule ceiling and was not scanned
    TooLarge { rule_count: usize, limit: usize },
}

/// Scan every rule pair of a table, in (i, j) order with i < j.
pub fn find_overlaps(table: &DecisionTable, max_rules: usize) -> OverlapScan<'_> {
    let rules = &table.rules;
    if rules.len() > max_rules {
        return OverlapScan::TooLarge {
            rule_count: rules.len(),
            limit: max_rules,
        };
    }

    let mut pairs = Vec::new();
    for (i, first) in rules.iter().enumerate() {
        for second in &rules[i + 1..] {
            if might_overlap(first, second) {
                pairs.push(OverlapPair { first, second });
            }
        }
    }
    OverlapScan::Pairs(pairs)
}
