use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Inclusive day range `[start, end]` — both boundary days are occupied.
///
/// Bookings are day-granular: a range that ends on the same day another
/// begins still collides, because both occupy that boundary day. This is a
/// deliberate policy (not the half-open checkout-day convention) and every
/// conflict decision in the crate goes through [`DayRange::overlaps`] so the
/// rule cannot drift between call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "DayRange start must not be after end");
        Self { start, end }
    }

    /// Single-day range (`start == end` is a valid one-day booking).
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Normalize two instants to day granularity, discarding time-of-day.
    pub fn from_instants(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start.date_naive(), end.date_naive())
    }

    /// Number of calendar days covered, boundary days included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// True iff the two ranges share at least one calendar day.
    ///
    /// Inclusive boundaries: touching end/start days count as shared.
    pub fn overlaps(&self, other: &DayRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_range(&self, other: &DayRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Lifecycle of a reservation. Only `Cancelled` frees the calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this status still occupies its days.
    pub fn occupies_calendar(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

/// A reservation tying a renter to a boat for a day range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub boat_id: Ulid,
    pub user_id: Ulid,
    pub range: DayRange,
    pub status: BookingStatus,
}

/// An owner-declared window in which the boat can be booked.
///
/// Windows are soft-deactivated (`is_active = false`) rather than deleted so
/// historical windows remain auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Ulid,
    pub boat_id: Ulid,
    pub range: DayRange,
    pub price_per_day: Option<f64>,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl AvailabilityWindow {
    pub fn new(id: Ulid, boat_id: Ulid, range: DayRange) -> Self {
        Self {
            id,
            boat_id,
            range,
            price_per_day: None,
            notes: None,
            is_active: true,
        }
    }
}

/// Per-boat calendar: all declared windows and all bookings, each kept
/// sorted by `range.start` so overlap scans can prune with binary search.
#[derive(Debug, Clone)]
pub struct BoatCalendar {
    pub boat_id: Ulid,
    pub name: Option<String>,
    pub windows: Vec<AvailabilityWindow>,
    pub bookings: Vec<Booking>,
}

impl BoatCalendar {
    pub fn new(boat_id: Ulid, name: Option<String>) -> Self {
        Self {
            boat_id,
            name,
            windows: Vec::new(),
            bookings: Vec::new(),
        }
    }

    /// Insert a window maintaining sort order by range.start.
    pub fn insert_window(&mut self, window: AvailabilityWindow) {
        let pos = self
            .windows
            .binary_search_by_key(&window.range.start, |w| w.range.start)
            .unwrap_or_else(|e| e);
        self.windows.insert(pos, window);
    }

    pub fn remove_window(&mut self, id: Ulid) -> Option<AvailabilityWindow> {
        let pos = self.windows.iter().position(|w| w.id == id)?;
        Some(self.windows.remove(pos))
    }

    pub fn window_mut(&mut self, id: Ulid) -> Option<&mut AvailabilityWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Insert a booking maintaining sort order by range.start.
    pub fn insert_booking(&mut self, booking: Booking) {
        let pos = self
            .bookings
            .binary_search_by_key(&booking.range.start, |b| b.range.start)
            .unwrap_or_else(|e| e);
        self.bookings.insert(pos, booking);
    }

    pub fn booking_mut(&mut self, id: Ulid) -> Option<&mut Booking> {
        self.bookings.iter_mut().find(|b| b.id == id)
    }

    /// Windows whose range overlaps the query, inclusive boundaries.
    /// Binary search prunes everything starting after `query.end`.
    pub fn windows_overlapping(&self, query: &DayRange) -> impl Iterator<Item = &AvailabilityWindow> {
        let right_bound = self
            .windows
            .partition_point(|w| w.range.start <= query.end);
        self.windows[..right_bound]
            .iter()
            .filter(move |w| w.range.end >= query.start)
    }

    /// Bookings whose range overlaps the query, inclusive boundaries.
    pub fn bookings_overlapping(&self, query: &DayRange) -> impl Iterator<Item = &Booking> {
        let right_bound = self
            .bookings
            .partition_point(|b| b.range.start <= query.end);
        self.bookings[..right_bound]
            .iter()
            .filter(move |b| b.range.end >= query.start)
    }
}
