mod availability;
mod conflict;
mod error;

pub use availability::{
    active_window_ranges, covering_window, is_date_available, is_within_availability,
    merge_ranges, open_ranges, subtract_ranges,
};
pub use conflict::{colliding_windows, conflicting_bookings, parse_day, parse_range};
pub use error::ResolveError;

use chrono::NaiveDate;
use serde::Serialize;
use ulid::Ulid;

use crate::model::{AvailabilityWindow, Booking, DayRange};
use crate::provider::CalendarProvider;
use crate::observability;

/// Why a requested range was rejected. Carries the entities the HTTP/UI
/// layers render back to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The range is not fully contained in any active window. Carries the
    /// merged bounds of the boat's active windows for user guidance.
    OutsideAvailability { windows: Vec<DayRange> },
    /// The range overlaps existing non-cancelled bookings.
    DateConflict { conflicts: Vec<Booking> },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::OutsideAvailability { windows } => {
                if windows.is_empty() {
                    write!(f, "outside availability: no active windows declared for this boat")
                } else {
                    write!(f, "outside availability: bookable periods are ")?;
                    for (i, w) in windows.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{} to {}", w.start, w.end)?;
                    }
                    Ok(())
                }
            }
            Rejection::DateConflict { conflicts } => {
                write!(f, "date conflict with {} existing booking(s): ", conflicts.len())?;
                for (i, b) in conflicts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} to {}", b.range.start, b.range.end)?;
                }
                Ok(())
            }
        }
    }
}

/// The resolution outcome for a requested range. All-or-nothing: there is no
/// partial acceptance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accept => None,
            Verdict::Reject(r) => Some(r),
        }
    }
}

/// Decide a requested range against already-fetched collections.
///
/// This is the single shared decision function: the provider-backed
/// [`Resolver`] and the in-memory fleet store both call it, so server-side
/// and pre-submit checks cannot disagree on boundary semantics.
pub fn decide(
    windows: &[AvailabilityWindow],
    bookings: &[Booking],
    range: &DayRange,
) -> Verdict {
    if !is_within_availability(windows, range) {
        return Verdict::Reject(Rejection::OutsideAvailability {
            windows: active_window_ranges(windows),
        });
    }
    let conflicts = conflicting_bookings(bookings, range, None);
    if !conflicts.is_empty() {
        return Verdict::Reject(Rejection::DateConflict { conflicts });
    }
    Verdict::Accept
}

/// Stateless decision layer over a black-box calendar provider.
///
/// Performs one read of windows and one read of bookings for the target boat
/// (issued concurrently — order-independent), then evaluates pure predicates
/// in memory. Never mutates state, never retries a failed read.
pub struct Resolver<P: CalendarProvider> {
    provider: P,
}

impl<P: CalendarProvider> Resolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Top-level decision for a requested range.
    pub async fn resolve(&self, boat_id: Ulid, range: DayRange) -> Result<Verdict, ResolveError> {
        conflict::validate_range(&range)?;

        let started = std::time::Instant::now();
        let (windows, bookings) = futures::future::try_join(
            self.provider.fetch_active_windows(boat_id),
            self.provider.fetch_open_bookings(boat_id),
        )
        .await
        .map_err(|e| ResolveError::Provider(e.to_string()))?;

        let verdict = decide(&windows, &bookings, &range);

        let outcome = observability::verdict_label(&verdict);
        metrics::counter!(observability::RESOLUTIONS_TOTAL, "outcome" => outcome).increment(1);
        metrics::histogram!(observability::RESOLUTION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        tracing::debug!(
            boat_id = %boat_id,
            start = %range.start,
            end = %range.end,
            outcome,
            "resolved booking request"
        );

        Ok(verdict)
    }

    /// True iff some active window fully contains the range.
    pub async fn is_within_availability(
        &self,
        boat_id: Ulid,
        range: DayRange,
    ) -> Result<bool, ResolveError> {
        conflict::validate_range(&range)?;
        let windows = self
            .provider
            .fetch_active_windows(boat_id)
            .await
            .map_err(|e| ResolveError::Provider(e.to_string()))?;
        Ok(is_within_availability(&windows, &range))
    }

    /// Non-cancelled bookings overlapping the range, optionally excluding one
    /// booking id when re-validating an edit.
    pub async fn find_conflicts(
        &self,
        boat_id: Ulid,
        range: DayRange,
        exclude_booking: Option<Ulid>,
    ) -> Result<Vec<Booking>, ResolveError> {
        conflict::validate_range(&range)?;
        let bookings = self
            .provider
            .fetch_open_bookings(boat_id)
            .await
            .map_err(|e| ResolveError::Provider(e.to_string()))?;
        Ok(conflicting_bookings(&bookings, &range, exclude_booking))
    }

    /// Single-day convenience form of `is_within_availability`.
    pub async fn is_date_available(
        &self,
        boat_id: Ulid,
        day: NaiveDate,
    ) -> Result<bool, ResolveError> {
        let windows = self
            .provider
            .fetch_active_windows(boat_id)
            .await
            .map_err(|e| ResolveError::Provider(e.to_string()))?;
        Ok(is_date_available(&windows, day))
    }

    /// Active windows a proposed window range would collide with, optionally
    /// excluding the window being edited.
    pub async fn check_window_conflicts(
        &self,
        boat_id: Ulid,
        range: DayRange,
        exclude_window: Option<Ulid>,
    ) -> Result<Vec<AvailabilityWindow>, ResolveError> {
        conflict::validate_range(&range)?;
        let windows = self
            .provider
            .fetch_active_windows(boat_id)
            .await
            .map_err(|e| ResolveError::Provider(e.to_string()))?;
        Ok(colliding_windows(&windows, &range, exclude_window))
    }
}
