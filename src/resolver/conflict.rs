use chrono::{DateTime, FixedOffset, NaiveDate};
use ulid::Ulid;

use crate::model::{AvailabilityWindow, Booking, DayRange};

use super::ResolveError;

pub(crate) fn validate_range(range: &DayRange) -> Result<(), ResolveError> {
    if range.start > range.end {
        return Err(ResolveError::InvalidRange(format!(
            "start {} is after end {}",
            range.start, range.end
        )));
    }
    Ok(())
}

/// Parse a single calendar day from caller input.
///
/// Accepts a plain ISO date (`2024-12-01`) or a full RFC 3339 datetime, whose
/// time-of-day is discarded — comparisons are day-granular.
pub fn parse_day(input: &str) -> Result<NaiveDate, ResolveError> {
    if let Ok(day) = input.parse::<NaiveDate>() {
        return Ok(day);
    }
    input
        .parse::<DateTime<FixedOffset>>()
        .map(|dt| dt.date_naive())
        .map_err(|_| ResolveError::InvalidRange(format!("unparseable date: {input:?}")))
}

/// Parse and normalize a requested range from two ISO date strings, rejecting
/// inverted ranges before any provider read.
pub fn parse_range(start: &str, end: &str) -> Result<DayRange, ResolveError> {
    let start = parse_day(start)?;
    let end = parse_day(end)?;
    let range = DayRange { start, end };
    validate_range(&range)?;
    Ok(range)
}

/// Every non-cancelled booking overlapping `range`, optionally excluding one
/// booking id (re-validating an existing booking being edited).
///
/// Order is irrelevant to callers; the result is treated as a set.
pub fn conflicting_bookings(
    bookings: &[Booking],
    range: &DayRange,
    exclude: Option<Ulid>,
) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| b.status.occupies_calendar())
        .filter(|b| exclude != Some(b.id))
        .filter(|b| b.range.overlaps(range))
        .cloned()
        .collect()
}

/// Active windows colliding with a proposed window range, optionally excluding
/// the window being edited.
///
/// The three collision cases (new window starts inside an existing one, ends
/// inside one, or fully contains one) all reduce to the single inclusive
/// overlap predicate — one scan, not three.
pub fn colliding_windows(
    windows: &[AvailabilityWindow],
    range: &DayRange,
    exclude: Option<Ulid>,
) -> Vec<AvailabilityWindow> {
    windows
        .iter()
        .filter(|w| w.is_active)
        .filter(|w| exclude != Some(w.id))
        .filter(|w| w.range.overlaps(range))
        .cloned()
        .collect()
}
