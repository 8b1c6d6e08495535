// Extractor abstraction for document analysis
//
// This module defines the boundary between reading a document (bytes -> tree)
// and analyzing it (tree -> DmnDocument -> issues). Checks only ever see the
// immutable DmnDocument, never the raw markup.

use super::dmn::xml_tree::XmlElement;
use crate::error::ExtractError;
use crate::types::DmnDocument;

/// Extractor trait - converts raw documents into the analysis model
///
/// Extraction happens in two steps:
/// 1. Bytes -> markup tree (fails on any well-formedness problem)
/// 2. Markup tree -> DmnDocument (never fails; missing parts become empty or defaulted fields)
pub trait Extractor: Send + Sync {
    /// Step 1: parse raw bytes into a namespace-agnostic element tree
    fn parse_markup(&self, bytes: &[u8]) -> Result<XmlElement, ExtractError>;

    /// Step 2: read decision tables, DRG elements and item definitions off the tree
    fn build_document(&self, root: &XmlElement) -> DmnDocument;

    /// Full extraction (combines both steps)
    fn extract(&self, bytes: &[u8]) -> Result<DmnDocument, ExtractError> {
        let root = self.parse_markup(bytes)?;
        Ok(self.build_document(&root))
    }

    /// Extractor name for logging
    fn name(&self) -> &str;
}
