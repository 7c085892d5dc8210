//! Input validation for user-submitted text, names, HTML and date ranges.
//!
//! Every request field passes through here before it reaches a repository:
//! canonicalization, then acceptance rules, then (for rich text) sanitization.
//! Validators are pure functions so they can be tested without any HTTP or
//! database scaffolding.

pub mod canonical;
pub mod dates;
pub mod name;
pub mod sanitize;
pub mod text;

pub use canonical::{canonical_decode, MAX_CANONICAL_INPUT};
pub use dates::validate_availability;
pub use name::{validate_name, MAX_NAME_LENGTH};
pub use sanitize::sanitize_html;
pub use text::{validate_string, MAX_STRING_LENGTH};

/// Rejection reasons produced by the validators.
///
/// `Invalid` carries a user-facing reason string; `InputTooLarge` is a hard
/// failure from the canonicalization stage and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Input exceeds the maximum allowed size")]
    InputTooLarge,
    #[error("{0}")]
    Invalid(String),
}
