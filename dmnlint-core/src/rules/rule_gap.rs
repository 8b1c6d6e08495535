use super::engine::{CheckContext, DocumentCheck};
use crate::types::*;
use anyhow::Result;

/// A numeric interval read from a rule's first input entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

/// Parse `lower..upper`, with any of `[ ] ( )` around it. Anything else is `None`.
pub fn parse_numeric_interval(entry: &str) -> Option<Interval> {
    let inner = entry
        .trim()
        .trim_matches(|c| matches!(c, '[' | ']' | '(' | ')'));
    let mut parts = inner.split("..");
    let (lower, upper) = match (parts.next(), parts.next(), parts.next()) {
        (Some(lower), Some(upper), None) => (lower, upper),
        _ => return None,
    };
    let lower: f64 = lower.trim().parse().ok()?;
    let upper: f64 = upper.trim().parse().ok()?;
    if lower.is_nan() || upper.is_nan() {
        return None;
    }
    Some(Interval { lower, upper })
}

/// Uncovered stretch between two adjacent intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    pub after: f64,
    pub before: f64,
}

/// Gaps between the numeric intervals of the table's first input column.
///
/// Intervals are ordered by lower bound (stable, so ties keep rule order) and
/// only neighbours are compared. Touching or overlapping intervals are not gaps.
pub fn find_gaps(table: &DecisionTable) -> Vec<Gap> {
    let mut intervals: Vec<Interval> = table
        .rules
        .iter()
        .filter_map(|rule| rule.input_entries.first())
        .filter_map(|entry| parse_numeric_interval(entry))
        .collect();
    intervals.sort_by(|a, b| a.lower.total_cmp(&b.lower));

    intervals
        .windows(2)
        .filter(|pair| pair[1].lower > pair[0].upper)
        .map(|pair| Gap {
            after: pair[0].upper,
            before: pair[1].lower,
        })
        .collect()
}

pub struct RuleGapCheck;

impl DocumentCheck for RuleGapCheck {
    fn apply(&self, ctx: &CheckContext<'_>) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        for table in &ctx.document.tables {
            for gap in find_gaps(table) {
                issues.push(
                    ValidationIssue::warning(format!(
                        "Potential rule gap detected between {} and {} in table '{}' (file: {}).",
                        gap.after, gap.before, table.id, ctx.file_name
                    ))
                    .with_element(Some(table.id.as_str()), None),
                );
            }
        }
        Ok(issues)
    }

    fn name(&self) -> &str {
        "RuleGap"
    }
}
