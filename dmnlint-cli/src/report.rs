//! Report envelope around per-document results.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use dmnlint_core::{Severity, ValidationResult};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable envelope with every issue
    Json,
    /// One block per document, for terminals
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub documents: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl ReportSummary {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let mut summary = Self {
            documents: results.len(),
            ..Self::default()
        };
        for result in results {
            if result.is_valid {
                summary.valid += 1;
            } else {
                summary.invalid += 1;
            }
            summary.errors += result.count(Severity::Error);
            summary.warnings += result.count(Severity::Warning);
            summary.infos += result.count(Severity::Info);
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub status: ReportStatus,
    pub message: String,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn new(results: Vec<ValidationResult>) -> Self {
        let summary = ReportSummary::from_results(&results);
        let (status, message) = if summary.documents == 0 {
            (ReportStatus::Failure, "No DMN documents found in the given inputs.".to_string())
        } else {
            (
                ReportStatus::Success,
                format!(
                    "Validated {} document(s): {} valid, {} invalid.",
                    summary.documents, summary.valid, summary.invalid
                ),
            )
        };
        Self {
            status,
            message,
            generated_at: Utc::now(),
            summary,
            results,
        }
    }

    /// True when the run should exit non-zero: nothing was found or something is invalid.
    pub fn has_failures(&self) -> bool {
        self.status == ReportStatus::Failure || self.summary.invalid > 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            let verdict = if result.is_valid { "VALID" } else { "INVALID" };
            let _ = writeln!(out, "{} [{}]", result.name, verdict);
            for issue in &result.issues {
                let _ = writeln!(out, "  {:<7} {}", issue.severity, issue.message);
            }
            out.push('\n');
        }
        let s = &self.summary;
        let _ = writeln!(
            out,
            "{} ({} errors, {} warnings, {} infos)",
            self.message, s.errors, s.warnings, s.infos
        );
        out
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Text => Ok(self.render_text()),
        }
    }
}
