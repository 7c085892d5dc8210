use super::ValidationError;

pub const MAX_NAME_LENGTH: usize = 100;
const MIN_NAME_LENGTH: usize = 2;

/// Separators allowed between letters of a name.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '\'')
}

/// Validate a human-name-shaped string.
///
/// Accepts Unicode letters (including accented letters) joined by single
/// spaces, hyphens or apostrophes: "Jean-Pierre", "D'Orazio", "José",
/// "Müller". Digits and symbols are rejected, as are leading/trailing
/// separators and runs of 3 or more separator characters.
pub fn validate_name(name: &str, max_length: usize) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Invalid("Name cannot be empty".to_string()));
    }

    let length = name.chars().count();
    if length < MIN_NAME_LENGTH {
        return Err(ValidationError::Invalid(format!(
            "Name must be at least {MIN_NAME_LENGTH} characters long"
        )));
    }

    let limit = max_length.min(MAX_NAME_LENGTH);
    if length > limit {
        return Err(ValidationError::Invalid(format!(
            "Name must not exceed {limit} characters"
        )));
    }

    if name.starts_with(is_separator) || name.ends_with(is_separator) {
        return Err(ValidationError::Invalid(
            "Name cannot start or end with a space, hyphen or apostrophe".to_string(),
        ));
    }

    let mut separator_run = 0;
    for c in name.chars() {
        if is_separator(c) {
            separator_run += 1;
            if separator_run >= 3 {
                return Err(ValidationError::Invalid(
                    "Name cannot contain 3 or more consecutive separator characters".to_string(),
                ));
            }
        } else if c.is_alphabetic() {
            separator_run = 0;
        } else {
            return Err(ValidationError::Invalid(
                "Name can only contain letters, spaces, hyphens and apostrophes".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_names() {
        for name in ["Jean-Pierre", "D'Orazio", "José", "Müller", "Mary Jane", "John--Doe"] {
            assert!(validate_name(name, MAX_NAME_LENGTH).is_ok(), "rejected {name:?}");
        }
    }

    #[test]
    fn rejects_digits_and_symbols() {
        for name in [
            "John123", "John<", "John&Co", "John\"", "John\\", "John/", "a@b", "100%", "J*hn",
            "(John)", "John=", "John+", "[John]", "{John}",
        ] {
            assert!(validate_name(name, MAX_NAME_LENGTH).is_err(), "accepted {name:?}");
        }
    }

    #[test]
    fn rejects_leading_and_trailing_separators() {
        for name in [" John", "John ", "-John", "John-", "'John", "John'"] {
            assert!(validate_name(name, MAX_NAME_LENGTH).is_err(), "accepted {name:?}");
        }
    }

    #[test]
    fn rejects_long_separator_runs() {
        // Two consecutive separators are fine, three are not
        assert!(validate_name("John--Doe", MAX_NAME_LENGTH).is_ok());
        assert!(validate_name("John---Doe", MAX_NAME_LENGTH).is_err());
        assert!(validate_name("John   Doe", MAX_NAME_LENGTH).is_err());
        assert!(validate_name("John-'-Doe", MAX_NAME_LENGTH).is_err());
    }

    #[test]
    fn enforces_length_bounds() {
        assert!(validate_name("J", MAX_NAME_LENGTH).is_err());
        assert!(validate_name("Jo", MAX_NAME_LENGTH).is_ok());
        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(validate_name(&long, MAX_NAME_LENGTH).is_err());
        // Caller may lower the maximum but not raise the ceiling
        assert!(validate_name("Jonathan", 5).is_err());
    }

    #[test]
    fn length_is_counted_in_characters_not_bytes() {
        // 50 two-byte characters, 100 bytes: within the 100-character bound
        let name = "é".repeat(50);
        assert!(validate_name(&name, MAX_NAME_LENGTH).is_ok());
    }
}
