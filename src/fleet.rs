use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::model::{AvailabilityWindow, BoatCalendar, Booking, BookingStatus, DayRange};
use crate::observability;
use crate::provider::{CalendarProvider, ProviderError};
use crate::resolver::{self, Rejection, Verdict};

pub type SharedBoatCalendar = Arc<RwLock<BoatCalendar>>;

#[derive(Debug)]
pub enum FleetError {
    NotFound(Ulid),
    AlreadyExists(Ulid),
    InvalidRange(String),
    InvalidPrice(f64),
    /// Requested range not contained in any active window; carries the
    /// merged active window bounds for user guidance.
    OutsideAvailability { windows: Vec<DayRange> },
    /// Requested range overlaps non-cancelled bookings.
    DateConflict { conflicts: Vec<Booking> },
    /// Proposed window overlaps other active windows for the boat.
    WindowCollision { collisions: Vec<AvailabilityWindow> },
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}

impl std::fmt::Display for FleetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FleetError::NotFound(id) => write!(f, "not found: {id}"),
            FleetError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            FleetError::InvalidRange(msg) => write!(f, "invalid date range: {msg}"),
            FleetError::InvalidPrice(p) => write!(f, "price must be non-negative, got {p}"),
            FleetError::OutsideAvailability { .. } => {
                write!(f, "requested dates are outside the boat's availability")
            }
            FleetError::DateConflict { conflicts } => {
                write!(f, "requested dates conflict with {} booking(s)", conflicts.len())
            }
            FleetError::WindowCollision { collisions } => {
                write!(f, "window overlaps {} existing window(s)", collisions.len())
            }
            FleetError::InvalidTransition { from, to } => {
                write!(f, "cannot move booking from {from:?} to {to:?}")
            }
        }
    }
}

impl std::error::Error for FleetError {}

impl From<Rejection> for FleetError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::OutsideAvailability { windows } => FleetError::OutsideAvailability { windows },
            Rejection::DateConflict { conflicts } => FleetError::DateConflict { conflicts },
        }
    }
}

/// In-memory fleet of boat calendars.
///
/// Each calendar sits behind its own `RwLock`; `request_booking` runs the
/// conflict decision and the insert under one write guard, which is the
/// serialization point that makes exactly one of two simultaneous
/// conflicting requests win. Implements [`CalendarProvider`], so a
/// [`resolver::Resolver`] can read it like any other persistence backend.
pub struct Fleet {
    boats: DashMap<Ulid, SharedBoatCalendar>,
    /// Reverse lookup: window/booking id → boat id.
    entity_to_boat: DashMap<Ulid, Ulid>,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

impl Fleet {
    pub fn new() -> Self {
        Self {
            boats: DashMap::new(),
            entity_to_boat: DashMap::new(),
        }
    }

    fn validated(range: &DayRange) -> Result<(), FleetError> {
        if range.start > range.end {
            return Err(FleetError::InvalidRange(format!(
                "start {} is after end {}",
                range.start, range.end
            )));
        }
        Ok(())
    }

    // ── Boats ────────────────────────────────────────────────

    pub fn register_boat(&self, boat_id: Ulid, name: Option<String>) -> Result<(), FleetError> {
        if self.boats.contains_key(&boat_id) {
            return Err(FleetError::AlreadyExists(boat_id));
        }
        let calendar = BoatCalendar::new(boat_id, name);
        self.boats.insert(boat_id, Arc::new(RwLock::new(calendar)));
        Ok(())
    }

    pub fn remove_boat(&self, boat_id: Ulid) -> Result<(), FleetError> {
        let (_, calendar) = self
            .boats
            .remove(&boat_id)
            .ok_or(FleetError::NotFound(boat_id))?;
        // try_read succeeds unless a request still holds the calendar;
        // in that case fall back to a full index scan.
        if let Ok(guard) = calendar.try_read() {
            for w in &guard.windows {
                self.entity_to_boat.remove(&w.id);
            }
            for b in &guard.bookings {
                self.entity_to_boat.remove(&b.id);
            }
        } else {
            self.entity_to_boat.retain(|_, boat| *boat != boat_id);
        }
        Ok(())
    }

    pub fn boat_count(&self) -> usize {
        self.boats.len()
    }

    pub fn contains_boat(&self, boat_id: &Ulid) -> bool {
        self.boats.contains_key(boat_id)
    }

    pub fn get_calendar(&self, boat_id: &Ulid) -> Option<SharedBoatCalendar> {
        self.boats.get(boat_id).map(|e| e.value().clone())
    }

    fn boat_for_entity(&self, entity_id: &Ulid) -> Option<Ulid> {
        self.entity_to_boat.get(entity_id).map(|e| *e.value())
    }

    /// Lookup entity → boat, get calendar, acquire write lock.
    async fn resolve_entity_write(
        &self,
        entity_id: &Ulid,
    ) -> Result<(Ulid, tokio::sync::OwnedRwLockWriteGuard<BoatCalendar>), FleetError> {
        let boat_id = self
            .boat_for_entity(entity_id)
            .ok_or(FleetError::NotFound(*entity_id))?;
        let calendar = self
            .get_calendar(&boat_id)
            .ok_or(FleetError::NotFound(boat_id))?;
        let guard = calendar.write_owned().await;
        Ok((boat_id, guard))
    }

    // ── Availability windows ─────────────────────────────────

    /// Declare a new window. Rejected if its range is inverted, its price is
    /// negative, or it overlaps another active window for the same boat.
    pub async fn add_window(&self, window: AvailabilityWindow) -> Result<(), FleetError> {
        Self::validated(&window.range)?;
        if let Some(price) = window.price_per_day
            && price < 0.0 {
                return Err(FleetError::InvalidPrice(price));
            }
        if self.entity_to_boat.contains_key(&window.id) {
            return Err(FleetError::AlreadyExists(window.id));
        }
        let calendar = self
            .get_calendar(&window.boat_id)
            .ok_or(FleetError::NotFound(window.boat_id))?;
        let mut guard = calendar.write().await;

        let collisions = resolver::colliding_windows(&guard.windows, &window.range, None);
        if !collisions.is_empty() {
            return Err(FleetError::WindowCollision { collisions });
        }

        self.entity_to_boat.insert(window.id, window.boat_id);
        tracing::info!(
            boat_id = %window.boat_id,
            window_id = %window.id,
            start = %window.range.start,
            end = %window.range.end,
            "availability window declared"
        );
        metrics::counter!(observability::WINDOWS_DECLARED_TOTAL).increment(1);
        guard.insert_window(window);
        Ok(())
    }

    /// Edit a window's range, price, or notes, re-validating collisions
    /// against the other active windows (the edited window excluded).
    pub async fn update_window(
        &self,
        window_id: Ulid,
        range: DayRange,
        price_per_day: Option<f64>,
        notes: Option<String>,
    ) -> Result<Ulid, FleetError> {
        Self::validated(&range)?;
        if let Some(price) = price_per_day
            && price < 0.0 {
                return Err(FleetError::InvalidPrice(price));
            }
        let (boat_id, mut guard) = self.resolve_entity_write(&window_id).await?;

        let collisions = resolver::colliding_windows(&guard.windows, &range, Some(window_id));
        if !collisions.is_empty() {
            return Err(FleetError::WindowCollision { collisions });
        }

        let mut window = guard
            .remove_window(window_id)
            .ok_or(FleetError::NotFound(window_id))?;
        window.range = range;
        window.price_per_day = price_per_day;
        window.notes = notes;
        guard.insert_window(window);
        Ok(boat_id)
    }

    /// Soft-deactivate a window. The record stays for audit; it simply stops
    /// counting toward availability and collision checks.
    pub async fn deactivate_window(&self, window_id: Ulid) -> Result<Ulid, FleetError> {
        let (boat_id, mut guard) = self.resolve_entity_write(&window_id).await?;
        let window = guard
            .window_mut(window_id)
            .ok_or(FleetError::NotFound(window_id))?;
        window.is_active = false;
        tracing::info!(boat_id = %boat_id, window_id = %window_id, "availability window deactivated");
        Ok(boat_id)
    }

    // ── Bookings ─────────────────────────────────────────────

    /// Request a booking. The availability and conflict decision runs under
    /// the boat's write lock, so the check and the insert are atomic with
    /// respect to concurrent requests for the same boat.
    pub async fn request_booking(
        &self,
        booking_id: Ulid,
        boat_id: Ulid,
        user_id: Ulid,
        range: DayRange,
    ) -> Result<Booking, FleetError> {
        Self::validated(&range)?;
        if self.entity_to_boat.contains_key(&booking_id) {
            return Err(FleetError::AlreadyExists(booking_id));
        }
        let calendar = self
            .get_calendar(&boat_id)
            .ok_or(FleetError::NotFound(boat_id))?;
        let mut guard = calendar.write().await;

        match resolver::decide(&guard.windows, &guard.bookings, &range) {
            Verdict::Accept => {}
            Verdict::Reject(rejection) => return Err(rejection.into()),
        }

        let booking = Booking {
            id: booking_id,
            boat_id,
            user_id,
            range,
            status: BookingStatus::Pending,
        };
        self.entity_to_boat.insert(booking_id, boat_id);
        guard.insert_booking(booking.clone());
        tracing::info!(
            boat_id = %boat_id,
            booking_id = %booking_id,
            start = %range.start,
            end = %range.end,
            "booking accepted"
        );
        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        Ok(booking)
    }

    /// Confirm a pending booking (payment settled). Confirming an already
    /// confirmed booking is a no-op.
    pub async fn confirm_booking(&self, booking_id: Ulid) -> Result<Ulid, FleetError> {
        let (boat_id, mut guard) = self.resolve_entity_write(&booking_id).await?;
        let booking = guard
            .booking_mut(booking_id)
            .ok_or(FleetError::NotFound(booking_id))?;
        match booking.status {
            BookingStatus::Pending | BookingStatus::Confirmed => {
                booking.status = BookingStatus::Confirmed;
                Ok(boat_id)
            }
            from => Err(FleetError::InvalidTransition {
                from,
                to: BookingStatus::Confirmed,
            }),
        }
    }

    /// Cancel a booking (explicit cancellation or failed payment). The record
    /// stays for audit but its days no longer occupy the calendar.
    /// Idempotent: cancelling a cancelled booking is a no-op.
    pub async fn cancel_booking(&self, booking_id: Ulid) -> Result<Ulid, FleetError> {
        let (boat_id, mut guard) = self.resolve_entity_write(&booking_id).await?;
        let booking = guard
            .booking_mut(booking_id)
            .ok_or(FleetError::NotFound(booking_id))?;
        if booking.status != BookingStatus::Cancelled {
            booking.status = BookingStatus::Cancelled;
            metrics::counter!(observability::BOOKINGS_CANCELLED_TOTAL).increment(1);
            tracing::info!(boat_id = %boat_id, booking_id = %booking_id, "booking cancelled");
        }
        Ok(boat_id)
    }

    // ── Queries ──────────────────────────────────────────────

    /// All windows for a boat, inactive ones included (audit view).
    pub async fn windows(&self, boat_id: Ulid) -> Vec<AvailabilityWindow> {
        match self.get_calendar(&boat_id) {
            Some(calendar) => calendar.read().await.windows.clone(),
            None => Vec::new(),
        }
    }

    /// All bookings for a boat, cancelled ones included (audit view).
    pub async fn bookings(&self, boat_id: Ulid) -> Vec<Booking> {
        match self.get_calendar(&boat_id) {
            Some(calendar) => calendar.read().await.bookings.clone(),
            None => Vec::new(),
        }
    }

    /// Free bookable days for a boat inside `query` (month-view rendering).
    pub async fn open_ranges(&self, boat_id: Ulid, query: DayRange) -> Result<Vec<DayRange>, FleetError> {
        Self::validated(&query)?;
        let calendar = match self.get_calendar(&boat_id) {
            Some(calendar) => calendar,
            None => return Ok(Vec::new()),
        };
        let guard = calendar.read().await;
        Ok(resolver::open_ranges(&guard.windows, &guard.bookings, &query))
    }
}

#[async_trait]
impl CalendarProvider for Fleet {
    async fn fetch_active_windows(
        &self,
        boat_id: Ulid,
    ) -> Result<Vec<AvailabilityWindow>, ProviderError> {
        let calendar = match self.get_calendar(&boat_id) {
            Some(calendar) => calendar,
            None => return Ok(Vec::new()),
        };
        let guard = calendar.read().await;
        Ok(guard.windows.iter().filter(|w| w.is_active).cloned().collect())
    }

    async fn fetch_open_bookings(&self, boat_id: Ulid) -> Result<Vec<Booking>, ProviderError> {
        let calendar = match self.get_calendar(&boat_id) {
            Some(calendar) => calendar,
            None => return Ok(Vec::new()),
        };
        let guard = calendar.read().await;
        Ok(guard
            .bookings
            .iter()
            .filter(|b| b.status.occupies_calendar())
            .cloned()
            .collect())
    }
}
