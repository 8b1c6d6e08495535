//! Literal classification for rule entries
//!
//! Entries are classified purely from their text into a closed set of kinds,
//! and compatibility with a column's declared type is one exhaustive match.
//! Nothing here evaluates an expression.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static DATE_CALL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^date\s*\(\s*".*"\s*\)$"#).unwrap());

static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}(Z|([+-]\d{2}:\d{2}))?$").unwrap());

static TIME_CALL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^time\s*\(\s*".*"\s*\)$"#).unwrap());

static DATE_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(Z|([+-]\d{2}:\d{2}))?$").unwrap()
});

static DATE_TIME_CALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(dateTime|date and time)\s*\(\s*".*"\s*\)$"#).unwrap()
});

/// Apparent kind of a raw entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Number,
    Boolean,
    QuotedString,
    Date,
    Time,
    DateTime,
    /// Unquoted text that is none of the above: a bare name or an expression
    Unknown,
}

/// Type named by a column's typeRef, after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Number,
    Boolean,
    String,
    Date,
    Time,
    DateTime,
    Custom(String),
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn is_number(text: &str) -> bool {
    match text.parse::<f64>() {
        // Rust also accepts "inf"/"nan" spellings; only the canonical ones count
        Ok(value) if value.is_finite() => true,
        Ok(_) => matches!(text, "NaN" | "Infinity" | "+Infinity" | "-Infinity"),
        Err(_) => false,
    }
}

/// Classify a raw entry. Surrounding whitespace is ignored.
pub fn classify_literal(raw: &str) -> LiteralKind {
    let text = raw.trim();
    if is_quoted(text) {
        LiteralKind::QuotedString
    } else if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        LiteralKind::Boolean
    } else if is_number(text) {
        LiteralKind::Number
    } else if DATE_TIME_REGEX.is_match(text) || DATE_TIME_CALL_REGEX.is_match(text) {
        LiteralKind::DateTime
    } else if DATE_REGEX.is_match(text) || DATE_CALL_REGEX.is_match(text) {
        LiteralKind::Date
    } else if TIME_REGEX.is_match(text) || TIME_CALL_REGEX.is_match(text) {
        LiteralKind::Time
    } else {
        LiteralKind::Unknown
    }
}

impl DeclaredType {
    /// Normalize a typeRef. Matching is case-insensitive and ignores a QName
    /// prefix such as `feel:`.
    pub fn parse(type_ref: &str) -> Self {
        let trimmed = type_ref.trim();
        let local = match trimmed.split_once(':') {
            Some((prefix, rest)) if !prefix.contains(char::is_whitespace) => rest.trim(),
            _ => trimmed,
        };
        match local.to_lowercase().as_str() {
            "number" | "integer" | "long" | "double" => DeclaredType::Number,
            "boolean" => DeclaredType::Boolean,
            "string" => DeclaredType::String,
            "date" => DeclaredType::Date,
            "time" => DeclaredType::Time,
            "datetime" | "date and time" => DeclaredType::DateTime,
            _ => DeclaredType::Custom(trimmed.to_string()),
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, DeclaredType::Custom(_))
    }

    /// Whether a literal of `kind` may appear in a column of this type.
    pub fn accepts(&self, kind: LiteralKind) -> bool {
        use LiteralKind as K;
        match (self, kind) {
            (DeclaredType::Number, K::Number) => true,
            (DeclaredType::Number, _) => false,

            (DeclaredType::Boolean, K::Boolean) => true,
            (DeclaredType::Boolean, _) => false,

            // bare names are read as strings too
            (DeclaredType::String, K::Number | K::Boolean) => false,
            (DeclaredType::String, _) => true,

            (DeclaredType::Date, K::Date) => true,
            (DeclaredType::Date, _) => false,

            (DeclaredType::Time, K::Time) => true,
            (DeclaredType::Time, _) => false,

            (DeclaredType::DateTime, K::DateTime) => true,
            (DeclaredType::DateTime, _) => false,

            (DeclaredType::Custom(_), _) => true,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Number => f.write_str("number"),
            DeclaredType::Boolean => f.write_str("boolean"),
            DeclaredType::String => f.write_str("string"),
            DeclaredType::Date => f.write_str("date"),
            DeclaredType::Time => f.write_str("time"),
            DeclaredType::DateTime => f.write_str("date and time"),
            DeclaredType::Custom(name) => f.write_str(name),
        }
    }
}

/// Convenience for the common case of checking one entry against one typeRef.
pub fn is_literal_consistent(raw: &str, type_ref: &str) -> bool {
    DeclaredType::parse(type_ref).accepts(classify_literal(raw))
}
