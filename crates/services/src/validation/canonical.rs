use std::borrow::Cow;

use super::ValidationError;

/// Inputs longer than this are rejected before any decoding work, bounding
/// the CPU cost of the repeated-decode loop.
pub const MAX_CANONICAL_INPUT: usize = 1_000_000;

/// Ceiling on decode passes for inputs that keep producing new encodings.
const MAX_DECODE_PASSES: usize = 10;

/// Repeatedly percent-decode and HTML-entity-decode `text` until it reaches a
/// fixed point, then return the canonical plaintext.
///
/// The canonical form is used only as a pre-pass for dangerous-pattern
/// detection; stored content keeps its original (or sanitized) form. The
/// function is idempotent at the fixed point: re-running it on its own output
/// returns the same output.
pub fn canonical_decode(text: &str) -> Result<String, ValidationError> {
    if text.chars().count() > MAX_CANONICAL_INPUT {
        return Err(ValidationError::InputTooLarge);
    }

    let mut current = text.to_string();
    for _ in 0..MAX_DECODE_PASSES {
        let decoded = decode_once(&current);
        if decoded == current {
            break;
        }
        current = decoded;
    }
    Ok(current)
}

fn decode_once(text: &str) -> String {
    // Percent sequences that do not decode to valid UTF-8 are left as-is
    let percent_decoded = match urlencoding::decode(text) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(text),
    };
    decode_html_entities(&percent_decoded)
}

/// Decode the common named HTML entities plus numeric character references.
/// Unrecognized entities pass through unchanged.
pub(crate) fn decode_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        // Entity names are short; anything without a nearby ';' is literal text
        let end = rest[1..].find(';').map(|i| i + 1);
        let Some(end) = end.filter(|&end| end <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };

        let entity = &rest[1..end];
        match decode_entity(entity) {
            Some(decoded) => {
                out.push_str(&decoded);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "sol" => '/',
        "nbsp" => ' ',
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)?
        }
    };
    Some(decoded.to_string())
}
