use chrono::{DateTime, Duration, Utc};

use super::ValidationError;

/// Longest accepted availability range.
const MAX_SPAN_DAYS: i64 = 730;

/// Validate an optional availability date range against the current time.
///
/// A single bound alone is valid. When both are present the end must come
/// after the start and the span may not exceed 2 years. Dates in the past are
/// rejected.
pub fn validate_availability(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    validate_availability_at(Utc::now(), start, end)
}

/// Range validation against an explicit `now`, so the rules can be tested
/// without depending on the wall clock.
pub fn validate_availability_at(
    now: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    for date in [start, end].into_iter().flatten() {
        if date < now {
            return Err(ValidationError::Invalid(
                "Availability dates cannot be in the past".to_string(),
            ));
        }
    }

    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(ValidationError::Invalid(
                "End date must be after start date".to_string(),
            ));
        }
        if end - start > Duration::days(MAX_SPAN_DAYS) {
            return Err(ValidationError::Invalid(
                "Availability range cannot exceed 2 years".to_string(),
            ));
        }
    }

    Ok(())
}
