use crate::config::ValidationConfig;
use crate::extractors::dmn::DEFINITIONS;
use crate::extractors::{DmnExtractor, Extractor};
use crate::rules::engine::panic_message;
use crate::rules::{CheckContext, CheckEngine};
use crate::types::*;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Issues describing the structural state of an extracted document.
fn syntax_issues(name: &str, document: &DmnDocument) -> Vec<ValidationIssue> {
    let mut issues = vec![ValidationIssue::info(format!("XML is well-formed for {name}."))];
    if document.root_name != DEFINITIONS {
        issues.push(
            ValidationIssue::warning(format!(
                "Root element '{}' of {} is not a DMN definitions element.",
                document.root_name, name
            ))
            .with_element(None, Some(document.root_name.as_str())),
        );
    }
    issues
}

pub struct DocumentProcessor {
    extractor: Box<dyn Extractor>,
    engine: CheckEngine,
    config: ValidationConfig,
    pool: Option<rayon::ThreadPool>,
}

impl DocumentProcessor {
    /// DMN extractor plus the checks enabled in `config`.
    pub fn new(config: ValidationConfig) -> Self {
        let extractor = Box::new(DmnExtractor::from_config(&config.description));
        Self::new_with_dependencies(extractor, config)
    }

    /// Create DocumentProcessor with an explicit extractor
    pub fn new_with_dependencies(extractor: Box<dyn Extractor>, config: ValidationConfig) -> Self {
        let engine = CheckEngine::new(&config);

        // a dedicated pool only when a thread count is pinned; otherwise rayon's global one
        let pool = if config.batch.threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.batch.threads)
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("Could not build a {}-thread pool, using the global pool: {}", config.batch.threads, e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            extractor,
            engine,
            config,
            pool,
        }
    }

    /// Validate one document. Always returns a result, even if analysis panics.
    pub fn validate_document(&self, name: &str, bytes: &[u8]) -> ValidationResult {
        match catch_unwind(AssertUnwindSafe(|| self.analyze(name, bytes))) {
            Ok(result) => result,
            Err(payload) => {
                let cause = panic_message(&*payload);
                warn!("Validation of {} aborted: {}", name, cause);
                ValidationResult::failed(name, format!("Unexpected error while validating {name}: {cause}"))
            }
        }
    }

    pub fn validate_source(&self, source: &SourceDocument) -> ValidationResult {
        self.validate_document(&source.name, &source.bytes)
    }

    /// Validate every document independently. Results come back in input order.
    pub fn validate_batch(&self, sources: &[SourceDocument]) -> Vec<ValidationResult> {
        let started = Instant::now();
        let results: Vec<ValidationResult> = if !self.config.batch.parallel || sources.len() < 2 {
            sources.iter().map(|s| self.validate_source(s)).collect()
        } else {
            let run = || {
                sources
                    .par_iter()
                    .map(|s| self.validate_source(s))
                    .collect::<Vec<_>>()
            };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        };

        let invalid = results.iter().filter(|r| !r.is_valid).count();
        info!(
            "Validated {} document(s) in {}ms, {} invalid",
            results.len(),
            started.elapsed().as_millis(),
            invalid
        );
        results
    }

    fn analyze(&self, name: &str, bytes: &[u8]) -> ValidationResult {
        let document = match self.extractor.extract(bytes) {
            Ok(document) => document,
            Err(e) => {
                info!("{} is not well-formed: {}", name, e);
                return ValidationResult::failed(name, format!("XML parsing error in {name}: {e}"));
            }
        };
        debug!(
            "{} extracted {} table(s) and {} DRG element(s) from {}",
            self.extractor.name(),
            document.tables.len(),
            document.elements.len(),
            name
        );

        // aggregation order: syntax first, then the checks in canonical order
        let mut issues = syntax_issues(name, &document);
        issues.extend(self.engine.run(&CheckContext::new(name, &document)));

        let result = ValidationResult::from_issues(name, issues, true);
        info!(
            "{}: {} ({} errors, {} warnings)",
            name,
            if result.is_valid { "valid" } else { "invalid" },
            result.count(Severity::Error),
            result.count(Severity::Warning)
        );
        result
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
