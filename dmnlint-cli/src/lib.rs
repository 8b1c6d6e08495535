// All validation logic is in dmnlint-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod report;
pub mod sources;

// Re-export core types for convenience
pub use dmnlint_core::*;

// Re-export CLI utilities
pub use report::{OutputFormat, ReportStatus, ReportSummary, ValidationReport};
pub use sources::{validate_collected, CollectedEntry, SourceCollector};
