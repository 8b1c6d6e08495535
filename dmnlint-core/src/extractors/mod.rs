//! Document Extractors
//!
//! This module turns raw document bytes into the immutable analysis model
//! consumed by the checks in [`crate::rules`].
//!
//! ## Architecture
//!
//! ```text
//! DMN bytes
//!     ↓
//! [xml_tree::parse]  (well-formedness, local names)
//!     ↓
//! XmlElement tree
//!     ↓
//! [DmnExtractor::build_document]
//!     ↓
//! DmnDocument (tables, DRG elements, item definitions)
//! ```

pub mod dmn;
pub mod traits;

pub use dmn::xml_tree::{XmlElement, XmlNode};
pub use dmn::DmnExtractor;
pub use traits::Extractor;
