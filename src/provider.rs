use async_trait::async_trait;
use ulid::Ulid;

use crate::model::{AvailabilityWindow, Booking};

/// Infrastructure failure reading a boat's calendar. Retryable at the
/// persistence client — no retry policy lives in the decision layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Black-box persistence seam the resolver reads from.
///
/// An unknown boat is not an error: it simply has no windows and no bookings,
/// which resolves to an outside-availability rejection. Implementations
/// return only what the decision layer consumes — active windows and
/// non-cancelled bookings.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn fetch_active_windows(
        &self,
        boat_id: Ulid,
    ) -> Result<Vec<AvailabilityWindow>, ProviderError>;

    async fn fetch_open_bookings(&self, boat_id: Ulid) -> Result<Vec<Booking>, ProviderError>;
}

#[async_trait]
impl<P: CalendarProvider + ?Sized> CalendarProvider for std::sync::Arc<P> {
    async fn fetch_active_windows(
        &self,
        boat_id: Ulid,
    ) -> Result<Vec<AvailabilityWindow>, ProviderError> {
        (**self).fetch_active_windows(boat_id).await
    }

    async fn fetch_open_bookings(&self, boat_id: Ulid) -> Result<Vec<Booking>, ProviderError> {
        (**self).fetch_open_bookings(boat_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Empty;

    #[async_trait]
    impl CalendarProvider for Empty {
        async fn fetch_active_windows(
            &self,
            _boat_id: Ulid,
        ) -> Result<Vec<AvailabilityWindow>, ProviderError> {
            Ok(Vec::new())
        }

        async fn fetch_open_bookings(&self, _boat_id: Ulid) -> Result<Vec<Booking>, ProviderError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn arc_provider_delegates() {
        let shared: Arc<Empty> = Arc::new(Empty);
        let windows = tokio_test::block_on(shared.fetch_active_windows(Ulid::new())).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn provider_error_displays_message() {
        let err = ProviderError::new("connection reset");
        assert_eq!(err.to_string(), "connection reset");
    }
}

