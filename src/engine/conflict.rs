use chrono::Utc;

use crate::limits::*;
use crate::model::*;

use super::BookingError;

pub(crate) fn now() -> Timestamp {
    Utc::now()
}

/// Trim and check a reservation title. Returns the trimmed title.
pub(crate) fn validate_title(title: &str) -> Result<String, BookingError> {
    let trimmed = title.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(BookingError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}

/// Chronological order first, then the bookable-duration window (both bounds inclusive).
pub(crate) fn validate_range(start: Timestamp, end: Timestamp) -> Result<Span, BookingError> {
    if start >= end {
        return Err(BookingError::InvalidRange);
    }
    let span = Span::new(start, end);
    let duration = span.duration();
    if duration < MIN_RESERVATION || duration > MAX_RESERVATION {
        return Err(BookingError::InvalidDuration);
    }
    Ok(span)
}

/// First live reservation on `rs` that overlaps `span`, as a `Conflict`.
pub(crate) fn check_no_conflict(rs: &ResourceState, span: &Span) -> Result<(), BookingError> {
    match rs.overlapping(span).next() {
        Some(existing) => Err(BookingError::Conflict(existing.id)),
        None => Ok(()),
    }
}
