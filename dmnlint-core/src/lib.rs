// dmnlint Core Library
//
// Semantic validation of DMN decision tables. Raw document bytes go through a
// pluggable extractor into an immutable model; independent checks then report
// issues, and validity is derived from the aggregated list.

pub mod config;
pub mod error;
pub mod extractors;
pub mod processor;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{GatingPolicy, ValidationConfig};
pub use error::ExtractError;
pub use extractors::{DmnExtractor, Extractor};
pub use processor::DocumentProcessor;
pub use rules::{CheckContext, CheckEngine, CheckKind, DocumentCheck};
pub use types::*;
