//! Record structs as stored by the hosted backend.
//!
//! Field names follow the backend's camelCase columns. Money columns are
//! [`Decimal`] in Rust and plain JSON numbers on the wire.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::BookingStatus;
use crate::ids::{BookingId, CabinId};

// ---------------------------------------------------------------------------
// Cabin
// ---------------------------------------------------------------------------

/// A rentable cabin as persisted in the `cabins` collection.
///
/// `image` is always a resolved public URL once a cabin exists; pending
/// uploads only live in drafts before the record is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Cabin {
    /// Store-assigned identifier.
    pub id: CabinId,
    /// Insertion timestamp, when the backend reports it.
    #[serde(default, rename = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    /// Display name (e.g. "001").
    pub name: String,
    /// Maximum number of guests the cabin sleeps.
    pub max_capacity: u32,
    /// Nightly rate before discount.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub regular_price: Decimal,
    /// Nightly discount, never above `regular_price`.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub discount: Decimal,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Public URL of the cabin photo.
    #[serde(default)]
    pub image: String,
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// Guest details captured on the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GuestData {
    /// Guest's full name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Human-readable nationality (e.g. "Germany").
    #[serde(default)]
    pub nationality: Option<String>,
    /// ISO 3166 alpha-2 country code.
    pub country_code: String,
    /// National identity document number.
    #[serde(rename = "nationalID")]
    pub national_id: String,
}

/// A booking as persisted in the `bookings` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Booking {
    /// Store-assigned identifier.
    pub id: BookingId,
    /// Insertion timestamp, when the backend reports it.
    #[serde(default, rename = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    /// First night of the stay.
    pub start_date: DateTime<Utc>,
    /// Departure date; always after `start_date`.
    pub end_date: DateTime<Utc>,
    /// Nights between start and end, at least one.
    pub num_nights: u32,
    /// Guests staying, at least one.
    pub num_guests: u32,
    /// Discounted cabin rate times nights.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub cabin_price: Decimal,
    /// Breakfast and other extras.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub extras_price: Decimal,
    /// `cabin_price + extras_price`.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub total_price: Decimal,
    /// Lifecycle state.
    pub status: BookingStatus,
    /// Whether breakfast is included.
    #[serde(default)]
    pub has_breakfast: bool,
    /// Whether the guest has paid.
    #[serde(default)]
    pub is_paid: bool,
    /// Free-text notes from the front desk.
    #[serde(default)]
    pub observations: Option<String>,
    /// The booked cabin.
    pub cabin_id: CabinId,
    /// Guest details.
    pub guest_data: GuestData,
}

/// Insert payload for a new booking. The store assigns `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    /// First night of the stay.
    pub start_date: DateTime<Utc>,
    /// Departure date.
    pub end_date: DateTime<Utc>,
    /// Nights between start and end.
    pub num_nights: u32,
    /// Guests staying.
    pub num_guests: u32,
    /// Discounted cabin rate times nights.
    #[serde(with = "rust_decimal::serde::float")]
    pub cabin_price: Decimal,
    /// Breakfast and other extras.
    #[serde(with = "rust_decimal::serde::float")]
    pub extras_price: Decimal,
    /// `cabin_price + extras_price`.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    /// Always [`BookingStatus::Unconfirmed`] on insert.
    pub status: BookingStatus,
    /// Whether breakfast is included.
    pub has_breakfast: bool,
    /// Whether the guest paid up front.
    pub is_paid: bool,
    /// Free-text notes.
    pub observations: Option<String>,
    /// The booked cabin.
    pub cabin_id: CabinId,
    /// Guest details.
    pub guest_data: GuestData,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Hotel-wide settings, stored as a single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Settings {
    /// Shortest bookable stay, in nights.
    pub min_booking_length: u32,
    /// Longest bookable stay, in nights.
    pub max_booking_length: u32,
    /// Upper bound on guests per booking.
    pub max_guests_per_booking: u32,
    /// Breakfast price per guest per night.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub breakfast_price: Decimal,
}
