use std::sync::OnceLock;

use regex::Regex;

use super::canonical::canonical_decode;
use super::ValidationError;

/// Hard ceiling applied regardless of the caller-supplied maximum.
pub const MAX_STRING_LENGTH: usize = 10_000;

/// Leading characters rejected outright: spreadsheet-formula injection
/// (`=`, `+`, `-`, `@`) and control-character smuggling (TAB, NUL).
const DANGEROUS_LEADING_CHARS: [char; 6] = ['=', '+', '-', '@', '\t', '\0'];

fn dangerous_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Markup-based injection
            r"(?i)<\s*script",
            r"(?i)<\s*/\s*script",
            r"(?i)<\s*iframe",
            r"(?i)javascript\s*:",
            r"(?i)\bon[a-z]+\s*=",
            // SQL keywords combined with suspicious syntax
            r"(?is)\bselect\b.+\bfrom\b",
            r"(?is)\bunion\b.+\bselect\b",
            r"(?i)\binsert\s+into\b",
            r"(?i)\bdrop\s+table\b",
            r"(?i)\bdelete\s+from\b",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("Failed to compile dangerous pattern regex"))
        .collect()
    })
}

/// Validate free-form text against length, leading-character and
/// canonical-form pattern rules.
///
/// The text is canonicalized (see [`canonical_decode`]) before pattern
/// matching so encoded payloads cannot slip past the blacklist. The original
/// text, not the canonical form, is what callers go on to store.
pub fn validate_string(text: &str, max_length: usize) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::Invalid("Text cannot be empty".to_string()));
    }

    let limit = max_length.min(MAX_STRING_LENGTH);
    if text.chars().count() > limit {
        return Err(ValidationError::Invalid(format!(
            "Text must not exceed {limit} characters"
        )));
    }

    if text.starts_with(DANGEROUS_LEADING_CHARS) {
        return Err(ValidationError::Invalid(
            "Text starts with a disallowed character".to_string(),
        ));
    }

    let canonical = canonical_decode(text)?;
    if dangerous_patterns()
        .iter()
        .any(|pattern| pattern.is_match(&canonical))
    {
        return Err(ValidationError::Invalid(
            "Text contains disallowed content".to_string(),
        ));
    }

    Ok(())
}
