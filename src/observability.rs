use crate::resolver::{Rejection, Verdict};

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total booking resolutions. Labels: outcome.
pub const RESOLUTIONS_TOTAL: &str = "berth_resolutions_total";

/// Histogram: resolution latency in seconds (provider reads + decision).
pub const RESOLUTION_DURATION_SECONDS: &str = "berth_resolution_duration_seconds";

// ── Fleet metrics (state-driven) ────────────────────────────────

/// Counter: bookings accepted into the store.
pub const BOOKINGS_CREATED_TOTAL: &str = "berth_bookings_created_total";

/// Counter: bookings cancelled (calendar days freed).
pub const BOOKINGS_CANCELLED_TOTAL: &str = "berth_bookings_cancelled_total";

/// Counter: availability windows declared by owners.
pub const WINDOWS_DECLARED_TOTAL: &str = "berth_windows_declared_total";

/// Map a verdict to a short label for metrics.
pub fn verdict_label(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Accept => "accept",
        Verdict::Reject(Rejection::OutsideAvailability { .. }) => "outside_availability",
        Verdict::Reject(Rejection::DateConflict { .. }) => "date_conflict",
    }
}
