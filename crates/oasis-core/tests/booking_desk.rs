//! Booking lifecycle against the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

mod common;

use oasis_core::{BookingDraft, CoreError, ValidationError};
use oasis_store::{StoreError, StoreOp};
use oasis_types::{BookingId, BookingStatus, CabinId, Collection};
use rust_decimal_macros::dec;

use common::{day, guest, ops, seed_booking, seed_cabin, seed_settings, session};

fn draft(cabin_id: CabinId) -> BookingDraft {
    BookingDraft {
        cabin_id,
        start_date: day(0),
        end_date: day(3),
        num_guests: Some(2),
        has_breakfast: true,
        is_paid: false,
        observations: Some("Late arrival".to_owned()),
        guest: guest(),
    }
}

#[tokio::test]
async fn create_derives_price_and_starts_unconfirmed() {
    let (session, memory) = session(10);
    seed_settings(&memory).await;
    let cabin = seed_cabin(&memory, 4).await;

    let booking = session.bookings.create_booking(draft(cabin)).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Unconfirmed);
    assert_eq!(booking.num_nights, 3);
    assert_eq!(booking.cabin_price, dec!(675));
    assert_eq!(booking.extras_price, dec!(90));
    assert_eq!(booking.total_price, dec!(765));
    assert_eq!(booking.cabin_id, cabin);
    assert_eq!(memory.records(Collection::Bookings).await.len(), 1);
}

#[tokio::test]
async fn guests_default_to_one() {
    let (session, memory) = session(10);
    seed_settings(&memory).await;
    let cabin = seed_cabin(&memory, 4).await;

    let mut d = draft(cabin);
    d.num_guests = None;
    let booking = session.bookings.create_booking(d).await.unwrap();

    assert_eq!(booking.num_guests, 1);
    assert_eq!(booking.extras_price, dec!(45));
}

#[tokio::test]
async fn invalid_email_is_rejected_before_any_write() {
    let (session, memory) = session(10);
    seed_settings(&memory).await;
    let cabin = seed_cabin(&memory, 4).await;
    memory.clear_journal().await;

    let mut d = draft(cabin);
    d.guest.email = "not-an-email".to_owned();
    let err = session.bookings.create_booking(d).await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::InvalidEmail(_))
    ));
    assert!(memory.journal().await.is_empty());
}

#[tokio::test]
async fn stay_and_party_bounds_are_enforced() {
    let (session, memory) = session(10);
    seed_settings(&memory).await;
    let cabin = seed_cabin(&memory, 4).await;

    let mut long = draft(cabin);
    long.end_date = day(40);
    assert!(matches!(
        session.bookings.create_booking(long).await,
        Err(CoreError::Validation(ValidationError::StayTooLong { nights: 40, max: 30 }))
    ));

    let mut crowded = draft(cabin);
    crowded.num_guests = Some(6);
    assert!(matches!(
        session.bookings.create_booking(crowded).await,
        Err(CoreError::Validation(ValidationError::TooManyGuests { guests: 6, max: 4 }))
    ));

    let mut reversed = draft(cabin);
    reversed.end_date = day(-1);
    assert!(matches!(
        session.bookings.create_booking(reversed).await,
        Err(CoreError::Validation(ValidationError::InvalidRange))
    ));

    assert!(!ops(&memory).await.contains(&StoreOp::Create));
}

#[tokio::test]
async fn check_in_marks_paid_and_can_add_breakfast() {
    let (session, memory) = session(10);
    seed_settings(&memory).await;
    let cabin = seed_cabin(&memory, 4).await;
    let id = BookingId(seed_booking(&memory, cabin, 0, BookingStatus::Unconfirmed).await);

    let booking = session.bookings.check_in(id, true).await.unwrap();

    assert_eq!(booking.status, BookingStatus::CheckedIn);
    assert!(booking.is_paid);
    assert!(booking.has_breakfast);
    assert_eq!(booking.extras_price, dec!(90));
    assert_eq!(booking.total_price, dec!(765));
}

#[tokio::test]
async fn check_in_without_breakfast_keeps_price() {
    let (session, memory) = session(10);
    seed_settings(&memory).await;
    let cabin = seed_cabin(&memory, 4).await;
    let id = BookingId(seed_booking(&memory, cabin, 0, BookingStatus::Unconfirmed).await);

    let booking = session.bookings.check_in(id, false).await.unwrap();

    assert!(booking.is_paid);
    assert!(!booking.has_breakfast);
    assert_eq!(booking.total_price, dec!(675));
}

#[tokio::test]
async fn illegal_transitions_write_nothing() {
    let (session, memory) = session(10);
    let cabin = seed_cabin(&memory, 4).await;
    let fresh = BookingId(seed_booking(&memory, cabin, 0, BookingStatus::Unconfirmed).await);
    let done = BookingId(seed_booking(&memory, cabin, 5, BookingStatus::CheckedOut).await);
    memory.clear_journal().await;

    let out = session.bookings.check_out(fresh).await.unwrap_err();
    assert!(matches!(
        out,
        CoreError::Validation(ValidationError::IllegalTransition {
            from: BookingStatus::Unconfirmed,
            to: BookingStatus::CheckedOut,
        })
    ));

    let back_in = session.bookings.check_in(done, false).await.unwrap_err();
    assert!(matches!(
        back_in,
        CoreError::Validation(ValidationError::IllegalTransition { .. })
    ));

    assert!(!ops(&memory).await.contains(&StoreOp::Update));
}

#[tokio::test]
async fn full_lifecycle() {
    let (session, memory) = session(10);
    seed_settings(&memory).await;
    let cabin = seed_cabin(&memory, 4).await;

    let created = session.bookings.create_booking(draft(cabin)).await.unwrap();
    let id = created.id;

    session.bookings.check_in(id, false).await.unwrap();
    let out = session.bookings.check_out(id).await.unwrap();
    assert_eq!(out.status, BookingStatus::CheckedOut);

    session.bookings.delete_booking(id).await.unwrap();
    assert!(matches!(
        session.bookings.get_booking(id).await,
        Err(CoreError::Store(StoreError::NotFound(_)))
    ));
}

#[tokio::test]
async fn get_booking_is_cached_until_mutation() {
    let (session, memory) = session(10);
    let cabin = seed_cabin(&memory, 4).await;
    let id = BookingId(seed_booking(&memory, cabin, 0, BookingStatus::Unconfirmed).await);

    let first = session.bookings.get_booking(id).await.unwrap();
    memory.clear_journal().await;
    let second = session.bookings.get_booking(id).await.unwrap();
    assert_eq!(first, second);
    assert!(memory.journal().await.is_empty());

    session.bookings.check_in(id, false).await.unwrap();
    let after = session.bookings.get_booking(id).await.unwrap();
    assert_eq!(after.status, BookingStatus::CheckedIn);
}

#[tokio::test]
async fn settings_are_read_once() {
    let (session, memory) = session(10);
    seed_settings(&memory).await;
    memory.clear_journal().await;

    let a = session.bookings.settings().await.unwrap();
    let b = session.bookings.settings().await.unwrap();

    assert_eq!(a.breakfast_price, dec!(15));
    assert_eq!(a, b);
    assert_eq!(ops(&memory).await, vec![StoreOp::Query]);
}

#[tokio::test]
async fn missing_settings_is_not_found() {
    let (session, _memory) = session(10);
    assert!(matches!(
        session.bookings.settings().await,
        Err(CoreError::Store(StoreError::NotFound(_)))
    ));
}
