//! Date-range availability and booking conflict resolution for a boat-rental
//! fleet.
//!
//! The core is one inclusive-boundary overlap predicate ([`model::DayRange`])
//! and one shared decision function ([`resolver::decide`]) that every caller
//! goes through — the provider-backed [`resolver::Resolver`] for reads against
//! external persistence, and the in-memory [`fleet::Fleet`] store, which runs
//! the same decision under a per-boat write lock before committing a booking.

pub mod fleet;
pub mod model;
pub mod observability;
pub mod provider;
pub mod resolver;

pub use fleet::{Fleet, FleetError};
pub use model::{AvailabilityWindow, BoatCalendar, Booking, BookingStatus, DayRange};
pub use provider::{CalendarProvider, ProviderError};
pub use resolver::{decide, parse_day, parse_range, Rejection, ResolveError, Resolver, Verdict};
