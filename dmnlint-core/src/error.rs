use thiserror::Error;

/// Structural failures while turning raw bytes into a [`crate::types::DmnDocument`].
///
/// Any of these is fatal for the document: no semantic check runs on it.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error("{message} (line: {line}, column: {column})")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("element <{name}> opened at line {line} is never closed")]
    UnclosedElement { name: String, line: usize },

    #[error("unexpected content after the root element (line: {line}, column: {column})")]
    TrailingContent { line: usize, column: usize },

    #[error("document has no root element")]
    MissingRoot,
}
