use crate::config::{GatingPolicy, ValidationConfig};
use crate::types::*;
use anyhow::Result;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::description::DescriptionCheck;
use super::hit_policy::HitPolicyCheck;
use super::rule_gap::RuleGapCheck;
use super::type_consistency::TypeConsistencyCheck;

/// Everything a check may look at for one document.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub file_name: &'a str,
    pub document: &'a DmnDocument,
}

impl<'a> CheckContext<'a> {
    pub fn new(file_name: &'a str, document: &'a DmnDocument) -> Self {
        Self {
            file_name,
            document,
        }
    }
}

/// A semantic check over one extracted document.
///
/// Checks are pure: they read the document and return their own issues.
/// Returning `Err` (or panicking) is converted by the engine into a single
/// ERROR issue; it never stops the other checks.
pub trait DocumentCheck: Send + Sync {
    fn apply(&self, ctx: &CheckContext<'_>) -> Result<Vec<ValidationIssue>>;
    fn name(&self) -> &str;
}

/// The checks the engine knows about, in canonical execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckKind {
    HitPolicy,
    Description,
    TypeConsistency,
    RuleGap,
}

impl CheckKind {
    pub const ALL: [CheckKind; 4] = [
        CheckKind::HitPolicy,
        CheckKind::Description,
        CheckKind::TypeConsistency,
        CheckKind::RuleGap,
    ];

    /// Name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            CheckKind::HitPolicy => "HitPolicy",
            CheckKind::Description => "Description",
            CheckKind::TypeConsistency => "TypeConsistency",
            CheckKind::RuleGap => "RuleGap",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Wording used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            CheckKind::HitPolicy => "hit policy",
            CheckKind::Description => "description",
            CheckKind::TypeConsistency => "type consistency",
            CheckKind::RuleGap => "rule gap",
        }
    }

    fn build(self, config: &ValidationConfig) -> Box<dyn DocumentCheck> {
        match self {
            CheckKind::HitPolicy => Box::new(HitPolicyCheck::new(config.overlap.max_rules)),
            CheckKind::Description => Box::new(DescriptionCheck::new(&config.description)),
            CheckKind::TypeConsistency => Box::new(TypeConsistencyCheck::new(
                config.type_consistency.resolve_item_definitions,
            )),
            CheckKind::RuleGap => Box::new(RuleGapCheck),
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Config-driven check pipeline.
pub struct CheckEngine {
    checks: Vec<(CheckKind, Box<dyn DocumentCheck>)>,
    gating: GatingPolicy,
}

impl CheckEngine {
    pub fn new(config: &ValidationConfig) -> Self {
        let mut kinds = Vec::new();
        for name in config.pipeline.enabled_names() {
            match CheckKind::from_name(name) {
                Some(kind) if !kinds.contains(&kind) => kinds.push(kind),
                Some(_) => debug!("Check {} listed more than once", name),
                None => warn!("Unknown check: {}. Skipping...", name),
            }
        }
        // aggregation order is fixed, whatever order the config lists them in
        kinds.sort();

        Self {
            checks: kinds.into_iter().map(|kind| (kind, kind.build(config))).collect(),
            gating: config.gating,
        }
    }

    /// Replace the check used for `kind`. Used to plug custom implementations
    /// (and failing ones in tests) into an otherwise configured engine.
    pub fn with_check(mut self, kind: CheckKind, check: Box<dyn DocumentCheck>) -> Self {
        match self.checks.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = check,
            None => {
                self.checks.push((kind, check));
                self.checks.sort_by_key(|(k, _)| *k);
            }
        }
        self
    }

    pub fn enabled_checks(&self) -> Vec<CheckKind> {
        self.checks.iter().map(|(kind, _)| *kind).collect()
    }

    /// Run every enabled check against one document and concatenate their issues.
    pub fn run(&self, ctx: &CheckContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut timings: Vec<(CheckKind, Duration)> = Vec::new();

        for (position, (kind, check)) in self.checks.iter().enumerate() {
            let started = Instant::now();
            let found = self.apply_check(*kind, check.as_ref(), ctx);
            timings.push((*kind, started.elapsed()));

            let failed = found.iter().any(ValidationIssue::is_error);
            issues.extend(found);

            let remaining = &self.checks[position + 1..];
            if failed && self.gating == GatingPolicy::StopOnError && !remaining.is_empty() {
                let skipped: Vec<&str> = remaining.iter().map(|(k, _)| k.name()).collect();
                debug!("Gating stops {} after {} for {}", skipped.join(", "), kind.name(), ctx.file_name);
                issues.push(ValidationIssue::info(format!(
                    "Skipped checks [{}] for {} because the {} check reported an error (gating: stop_on_error).",
                    skipped.join(", "),
                    ctx.file_name,
                    kind.label()
                )));
                break;
            }
        }

        for (kind, elapsed) in &timings {
            debug!("{} check on {} took {:?}", kind.name(), ctx.file_name, elapsed);
        }
        issues
    }

    fn apply_check(
        &self,
        kind: CheckKind,
        check: &dyn DocumentCheck,
        ctx: &CheckContext<'_>,
    ) -> Vec<ValidationIssue> {
        let cause = match catch_unwind(AssertUnwindSafe(|| check.apply(ctx))) {
            Ok(Ok(issues)) => {
                debug!("{} produced {} issue(s) for {}", check.name(), issues.len(), ctx.file_name);
                return issues;
            }
            Ok(Err(e)) => format!("{e:#}"),
            Err(payload) => panic_message(&*payload),
        };

        warn!("{} failed on {}: {}", check.name(), ctx.file_name, cause);
        vec![ValidationIssue::error(format!(
            "Error during {} analysis for {}: {}",
            kind.label(),
            ctx.file_name,
            cause
        ))]
    }
}
