//! End-to-end booking lifecycle against the in-memory fleet, read through the
//! same provider seam an external persistence layer would implement.

use std::sync::Arc;

use chrono::NaiveDate;
use ulid::Ulid;

use berth::{
    AvailabilityWindow, BookingStatus, DayRange, Fleet, FleetError, Rejection, Resolver, Verdict,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn r(s: (i32, u32, u32), e: (i32, u32, u32)) -> DayRange {
    DayRange::new(d(s.0, s.1, s.2), d(e.0, e.1, e.2))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn full_booking_lifecycle() {
    init_tracing();

    let fleet = Arc::new(Fleet::new());
    let boat = Ulid::new();
    fleet.register_boat(boat, Some("Sea Otter".into())).unwrap();

    let mut summer = AvailabilityWindow::new(Ulid::new(), boat, r((2024, 6, 1), (2024, 8, 31)));
    summer.price_per_day = Some(240.0);
    fleet.add_window(summer).await.unwrap();
    fleet
        .add_window(AvailabilityWindow::new(Ulid::new(), boat, r((2024, 12, 20), (2024, 12, 31))))
        .await
        .unwrap();

    let resolver = Resolver::new(fleet.clone());

    // Inside the summer window, empty calendar: accept.
    let requested = r((2024, 7, 10), (2024, 7, 14));
    let verdict = resolver.resolve(boat, requested).await.unwrap();
    assert!(verdict.is_accepted());

    // Commit the booking and confirm it.
    let renter = Ulid::new();
    let booking = fleet
        .request_booking(Ulid::new(), boat, renter, requested)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
    fleet.confirm_booking(booking.id).await.unwrap();

    // A request sharing the checkout day conflicts (inclusive boundaries).
    let verdict = resolver
        .resolve(boat, r((2024, 7, 14), (2024, 7, 18)))
        .await
        .unwrap();
    match verdict.rejection() {
        Some(Rejection::DateConflict { conflicts }) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].id, booking.id);
        }
        other => panic!("expected DateConflict, got {other:?}"),
    }

    // The day after checkout is free again.
    let verdict = resolver
        .resolve(boat, r((2024, 7, 15), (2024, 7, 18)))
        .await
        .unwrap();
    assert!(verdict.is_accepted());

    // Between windows: rejected with guidance listing both windows.
    let verdict = resolver
        .resolve(boat, r((2024, 10, 1), (2024, 10, 5)))
        .await
        .unwrap();
    match verdict.rejection() {
        Some(Rejection::OutsideAvailability { windows }) => {
            assert_eq!(
                windows,
                &vec![r((2024, 6, 1), (2024, 8, 31)), r((2024, 12, 20), (2024, 12, 31))]
            );
        }
        other => panic!("expected OutsideAvailability, got {other:?}"),
    }

    // Cancellation frees the days for the next renter.
    fleet.cancel_booking(booking.id).await.unwrap();
    let verdict = resolver.resolve(boat, requested).await.unwrap();
    assert!(verdict.is_accepted());
}

#[tokio::test]
async fn store_and_resolver_agree_on_every_verdict() {
    init_tracing();

    let fleet = Arc::new(Fleet::new());
    let boat = Ulid::new();
    fleet.register_boat(boat, None).unwrap();
    fleet
        .add_window(AvailabilityWindow::new(Ulid::new(), boat, r((2024, 12, 1), (2024, 12, 7))))
        .await
        .unwrap();
    let occupied = fleet
        .request_booking(Ulid::new(), boat, Ulid::new(), r((2024, 12, 3), (2024, 12, 4)))
        .await
        .unwrap();

    let resolver = Resolver::new(fleet.clone());

    // A request the resolver rejects must be rejected identically by the
    // store's own commit-time check, and vice versa.
    let cases = [
        r((2024, 12, 5), (2024, 12, 7)),   // free tail of the window
        r((2024, 12, 2), (2024, 12, 5)),   // overlaps the booking
        r((2024, 12, 4), (2024, 12, 4)),   // single occupied day
        r((2024, 11, 25), (2024, 11, 30)), // outside the window
        r((2024, 12, 6), (2024, 12, 8)),   // straddles the window end
    ];

    for requested in cases {
        let verdict = resolver.resolve(boat, requested).await.unwrap();
        let commit = fleet
            .request_booking(Ulid::new(), boat, Ulid::new(), requested)
            .await;
        match (&verdict, &commit) {
            (Verdict::Accept, Ok(b)) => {
                // Roll back so later cases see the original calendar.
                fleet.cancel_booking(b.id).await.unwrap();
            }
            (Verdict::Reject(Rejection::DateConflict { conflicts }), Err(FleetError::DateConflict { conflicts: store_conflicts })) => {
                assert_eq!(conflicts, store_conflicts, "conflict sets differ for {requested:?}");
                assert!(conflicts.iter().all(|c| c.id == occupied.id));
            }
            (Verdict::Reject(Rejection::OutsideAvailability { .. }), Err(FleetError::OutsideAvailability { .. })) => {}
            (verdict, commit) => panic!("disagreement for {requested:?}: {verdict:?} vs {commit:?}"),
        }
    }
}

#[tokio::test]
async fn month_view_open_ranges() {
    init_tracing();

    let fleet = Fleet::new();
    let boat = Ulid::new();
    fleet.register_boat(boat, None).unwrap();
    fleet
        .add_window(AvailabilityWindow::new(Ulid::new(), boat, r((2024, 12, 1), (2024, 12, 15))))
        .await
        .unwrap();
    fleet
        .add_window(AvailabilityWindow::new(Ulid::new(), boat, r((2024, 12, 16), (2024, 12, 31))))
        .await
        .unwrap();
    fleet
        .request_booking(Ulid::new(), boat, Ulid::new(), r((2024, 12, 24), (2024, 12, 26)))
        .await
        .unwrap();

    let free = fleet
        .open_ranges(boat, r((2024, 12, 1), (2024, 12, 31)))
        .await
        .unwrap();
    // Adjacent windows merge into one stretch, minus the holiday booking.
    assert_eq!(
        free,
        vec![r((2024, 12, 1), (2024, 12, 23)), r((2024, 12, 27), (2024, 12, 31))]
    );
}
