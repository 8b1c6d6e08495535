use super::engine::{CheckContext, DocumentCheck};
use super::overlap::{find_overlaps, same_outputs, OverlapPair, OverlapScan};
use crate::types::*;
use anyhow::Result;
use tracing::debug;

/// Judges overlapping rule pairs against the table's hit policy.
///
/// Overlap detection and policy evaluation are one pass: every overlapping
/// pair yields at most one issue. UNIQUE rejects any overlap, ANY rejects
/// overlaps whose outputs differ, and every other policy gets an INFO note
/// asking for manual review.
pub struct HitPolicyCheck {
    max_rules: usize,
}

impl HitPolicyCheck {
    pub fn new(max_rules: usize) -> Self {
        Self { max_rules }
    }

    pub fn check_table(&self, table: &DecisionTable, file_name: &str) -> Vec<ValidationIssue> {
        if table.rules.len() < 2 {
            return Vec::new();
        }

        let pairs = match find_overlaps(table, self.max_rules) {
            OverlapScan::Pairs(pairs) => pairs,
            OverlapScan::TooLarge { rule_count, limit } => {
                debug!("Skipping overlap scan of '{}': {} rules", table.id, rule_count);
                return vec![ValidationIssue::info(format!(
                    "Decision table '{}' (file: {}) has {} rules, above the limit of {}: table too large for exhaustive overlap analysis.",
                    table.id, file_name, rule_count, limit
                ))
                .with_element(Some(table.id.as_str()), None)];
            }
        };

        let policy = table.policy();
        if !policy.is_modelled() && !pairs.is_empty() {
            debug!("'{}' uses hit policy {}, overlaps are left for review", table.id, policy);
        }
        pairs
            .iter()
            .filter_map(|pair| judge(&policy, pair, table, file_name))
            .collect()
    }
}

fn judge(
    policy: &HitPolicy,
    pair: &OverlapPair<'_>,
    table: &DecisionTable,
    file_name: &str,
) -> Option<ValidationIssue> {
    let rules = format!(
        "{} and {}",
        pair.first.display_label(),
        pair.second.display_label()
    );
    let issue = match policy {
        HitPolicy::Unique => ValidationIssue::error(format!(
            "{} in table '{}' (file: {}) overlap, which violates UNIQUE hit policy.",
            rules, table.id, file_name
        )),
        HitPolicy::Any if same_outputs(pair.first, pair.second) => return None,
        HitPolicy::Any => ValidationIssue::error(format!(
            "{} in table '{}' (file: {}) overlap but have different outputs, which violates ANY hit policy.",
            rules, table.id, file_name
        )),
        other => ValidationIssue::info(format!(
            "{} in table '{}' (file: {}) overlap. Hit policy '{}' is not explicitly validated, manual review recommended.",
            rules, table.id, file_name, other
        )),
    };
    Some(issue.with_element(Some(table.id.as_str()), Some(rules.as_str())))
}

impl DocumentCheck for HitPolicyCheck {
    fn apply(&self, ctx: &CheckContext<'_>) -> Result<Vec<ValidationIssue>> {
        Ok(ctx
            .document
            .tables
            .iter()
            .flat_map(|table| self.check_table(table, ctx.file_name))
            .collect())
    }

    fn name(&self) -> &str {
        "HitPolicy"
    }
}
