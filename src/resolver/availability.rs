use chrono::NaiveDate;

use crate::model::{AvailabilityWindow, Booking, DayRange};

// ── Containment checks ────────────────────────────────────────────

/// The first active window fully containing `range`, if any.
///
/// Containment is per-window: two adjacent windows that would jointly cover
/// the range do not count. An owner wanting a longer bookable stretch
/// declares a longer window.
pub fn covering_window<'a>(
    windows: &'a [AvailabilityWindow],
    range: &DayRange,
) -> Option<&'a AvailabilityWindow> {
    windows
        .iter()
        .filter(|w| w.is_active)
        .find(|w| w.range.contains_range(range))
}

/// True iff some active window fully contains the requested range.
pub fn is_within_availability(windows: &[AvailabilityWindow], range: &DayRange) -> bool {
    covering_window(windows, range).is_some()
}

/// Single-day convenience form: agrees with
/// `is_within_availability(windows, DayRange::single(day))` for every day.
pub fn is_date_available(windows: &[AvailabilityWindow], day: NaiveDate) -> bool {
    windows
        .iter()
        .filter(|w| w.is_active)
        .any(|w| w.range.contains_day(day))
}

/// Bounds of all active windows, merged, for rejection guidance messages.
pub fn active_window_ranges(windows: &[AvailabilityWindow]) -> Vec<DayRange> {
    let mut ranges: Vec<DayRange> = windows
        .iter()
        .filter(|w| w.is_active)
        .map(|w| w.range)
        .collect();
    ranges.sort_by_key(|r| r.start);
    merge_ranges(&ranges)
}

// ── Free-calendar computation ─────────────────────────────────────

/// Merge sorted overlapping/adjacent day ranges into disjoint ranges.
/// Adjacent means touching with no gap day between them.
pub fn merge_ranges(sorted: &[DayRange]) -> Vec<DayRange> {
    let mut merged: Vec<DayRange> = Vec::new();
    for &range in sorted {
        if let Some(last) = merged.last_mut()
            && last.end.succ_opt().is_none_or(|next| range.start <= next) {
                last.end = last.end.max(range.end);
                continue;
            }
        merged.push(range);
    }
    merged
}

/// Remove `to_remove` days from `base`, both sorted by start and `base`
/// disjoint. Inclusive arithmetic: removing `[s, e]` from a base range leaves
/// `[.., s-1]` and `[e+1, ..]`.
pub fn subtract_ranges(base: &[DayRange], to_remove: &[DayRange]) -> Vec<DayRange> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        while ri < to_remove.len() && to_remove[ri].end < b.start {
            ri += 1;
        }

        let mut cursor = b.start;
        let mut open = true;
        let mut j = ri;
        while open && j < to_remove.len() && to_remove[j].start <= b.end {
            let r = to_remove[j];
            j += 1;
            if r.end < cursor {
                continue;
            }
            if r.start > cursor {
                // Gap before this removal: [cursor, r.start - 1].
                let gap_end = r.start.pred_opt().unwrap_or(r.start);
                result.push(DayRange::new(cursor, gap_end));
            }
            match r.end.succ_opt() {
                Some(next) if next <= b.end => cursor = next,
                _ => open = false,
            }
        }

        if open && cursor <= b.end {
            result.push(DayRange::new(cursor, b.end));
        }
    }

    result
}

/// Free bookable days for one boat inside `query`: active windows clamped to
/// the query and merged, minus the days occupied by non-cancelled bookings.
/// Feeds month-view calendar rendering.
pub fn open_ranges(
    windows: &[AvailabilityWindow],
    bookings: &[Booking],
    query: &DayRange,
) -> Vec<DayRange> {
    let mut free: Vec<DayRange> = windows
        .iter()
        .filter(|w| w.is_active)
        .filter(|w| w.range.overlaps(query))
        .map(|w| clamp(&w.range, query))
        .collect();
    free.sort_by_key(|r| r.start);
    let free = merge_ranges(&free);

    let mut occupied: Vec<DayRange> = bookings
        .iter()
        .filter(|b| b.status.occupies_calendar())
        .filter(|b| b.range.overlaps(query))
        .map(|b| clamp(&b.range, query))
        .collect();
    occupied.sort_by_key(|r| r.start);

    if occupied.is_empty() {
        free
    } else {
        subtract_ranges(&free, &occupied)
    }
}

fn clamp(range: &DayRange, query: &DayRange) -> DayRange {
    DayRange::new(range.start.max(query.start), range.end.min(query.end))
}
