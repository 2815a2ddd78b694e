//! Seed data shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use oasis_core::Session;
use oasis_store::{MemoryStore, StoreBackend, StoreOp, record_id};
use oasis_types::{BookingStatus, CabinId, Collection, GuestData, NewBooking};
use rust_decimal::Decimal;
use serde_json::json;

/// A session over a fresh memory store, plus a handle on that store.
pub fn session(page_size: u32) -> (Session, MemoryStore) {
    let memory = MemoryStore::new();
    let session = Session::new(StoreBackend::from(memory.clone()), page_size);
    (session, memory)
}

pub fn day(d: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap() + Duration::days(d)
}

pub fn guest() -> GuestData {
    GuestData {
        full_name: "Jonas Mueller".to_owned(),
        email: "jonas@example.com".to_owned(),
        nationality: Some("Germany".to_owned()),
        country_code: "de".to_owned(),
        national_id: "1234523212".to_owned(),
    }
}

pub async fn seed_settings(memory: &MemoryStore) {
    memory
        .create_record(
            Collection::Settings,
            &json!({
                "minBookingLength": 1,
                "maxBookingLength": 30,
                "maxGuestsPerBooking": 8,
                "breakfastPrice": 15
            }),
        )
        .await
        .expect("seed settings");
}

pub async fn seed_cabin(memory: &MemoryStore, max_capacity: u32) -> CabinId {
    let row = memory
        .create_record(
            Collection::Cabins,
            &json!({
                "name": "001",
                "maxCapacity": max_capacity,
                "regularPrice": 250,
                "discount": 25,
                "description": "Small luxury cabin",
                "image": "memory://oasis/storage/v1/object/public/cabin-images/cabin-001.jpg"
            }),
        )
        .await
        .expect("seed cabin");
    CabinId(record_id(&row).unwrap())
}

/// Insert one booking starting `offset` days after the base day.
pub async fn seed_booking(
    memory: &MemoryStore,
    cabin_id: CabinId,
    offset: i64,
    status: BookingStatus,
) -> i64 {
    let booking = NewBooking {
        start_date: day(offset),
        end_date: day(offset + 3),
        num_nights: 3,
        num_guests: 2,
        cabin_price: Decimal::from(675),
        extras_price: Decimal::ZERO,
        total_price: Decimal::from(675),
        status,
        has_breakfast: false,
        is_paid: false,
        observations: None,
        cabin_id,
        guest_data: guest(),
    };
    let row = memory
        .create_record(Collection::Bookings, &serde_json::to_value(&booking).unwrap())
        .await
        .expect("seed booking");
    record_id(&row).unwrap()
}

/// Seed `n` bookings, alternating `unconfirmed` and `checked-in`.
pub async fn seed_bookings(memory: &MemoryStore, cabin_id: CabinId, n: i64) {
    for i in 0..n {
        let status = if i % 2 == 0 {
            BookingStatus::Unconfirmed
        } else {
            BookingStatus::CheckedIn
        };
        seed_booking(memory, cabin_id, i, status).await;
    }
}

/// Operation kinds journaled since the last clear.
pub async fn ops(memory: &MemoryStore) -> Vec<StoreOp> {
    memory.journal().await.iter().map(|c| c.op()).collect()
}
