use std::sync::OnceLock;

use regex::Regex;

use crate::models::ValidationError;

const PERMITTED_LEADING_KEYWORDS: &[&str] = &["SELECT", "WITH"];

/// Syntactic allow-list for ad-hoc SQL: the trimmed text must start with
/// `SELECT` or `WITH`, compared case-insensitively.
///
/// This is not a parser. Text after a statement separator is not inspected,
/// so `SELECT 1; DROP TABLE products` passes this check.
pub fn check(query: &str) -> Result<&str, ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }

    let normalized = trimmed.to_ascii_uppercase();
    if PERMITTED_LEADING_KEYWORDS
        .iter()
        .any(|keyword| normalized.starts_with(keyword))
    {
        return Ok(trimmed);
    }

    Err(ValidationError::DisallowedStatement {
        leading_keyword: leading_keyword(&normalized),
    })
}

#[must_use]
pub fn is_permitted(query: &str) -> bool {
    check(query).is_ok()
}

fn leading_keyword(normalized: &str) -> String {
    leading_keyword_regex()
        .find(normalized)
        .map(|found| found.as_str())
        .or_else(|| normalized.split_whitespace().next())
        .unwrap_or("unknown")
        .to_string()
}

fn leading_keyword_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Z_][A-Z0-9_]*").expect("leading keyword regex should compile")
    })
}
