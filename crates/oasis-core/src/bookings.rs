//! Booking lifecycle: create, check in, check out, delete.
//!
//! Status only ever moves one step forward:
//!
//! ```text
//! unconfirmed ──check_in──► checked-in ──check_out──► checked-out
//! ```
//!
//! Every price written here comes from [`crate::pricing`]. Every mutation
//! invalidates the bookings namespace of the session cache, which covers all
//! booking pages and single-booking entries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use oasis_store::{RecordQuery, StoreBackend, StoreError};
use oasis_types::{
    Booking, BookingId, BookingStatus, Cabin, CabinId, Collection, GuestData, NewBooking, Settings,
};
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidateEmail;

use crate::cache::{Cached, QueryKey, SessionCache};
use crate::error::{CoreError, ValidationError, decode};
use crate::fields::{self, Field};
use crate::pricing::{self, CabinRate, PriceQuote, StayRange};

/// A booking as submitted from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    /// Cabin being booked.
    pub cabin_id: CabinId,
    /// Arrival.
    pub start_date: DateTime<Utc>,
    /// Departure.
    pub end_date: DateTime<Utc>,
    /// Guests staying. Defaults to one.
    pub num_guests: Option<u32>,
    /// Whether breakfast is included.
    pub has_breakfast: bool,
    /// Whether the stay is paid up front.
    pub is_paid: bool,
    /// Free-text notes.
    pub observations: Option<String>,
    /// Primary guest.
    pub guest: GuestData,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_breakfast: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    extras_price: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    total_price: Option<Decimal>,
}

/// Booking operations over the store and the session cache.
#[derive(Debug, Clone)]
pub struct BookingDesk {
    store: StoreBackend,
    cache: Arc<SessionCache>,
}

impl BookingDesk {
    /// Create a desk over `store`, sharing `cache` with the session.
    pub const fn new(store: StoreBackend, cache: Arc<SessionCache>) -> Self {
        Self { store, cache }
    }

    /// The hotel settings row (cached).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no settings row exists, or any
    /// store or decode error.
    pub async fn settings(&self) -> Result<Arc<Settings>, CoreError> {
        let key = QueryKey::all(Collection::Settings);
        if let Some(Cached::Settings(settings)) = self.cache.get(&key).await {
            return Ok(settings);
        }

        let page = self
            .store
            .query_records(Collection::Settings, &RecordQuery::all())
            .await?;
        let row = page
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound("settings".to_owned()))?;
        let settings = Arc::new(decode::<Settings>("settings", row)?);
        self.cache
            .set(key, Cached::Settings(Arc::clone(&settings)))
            .await;
        Ok(settings)
    }

    /// One booking (cached).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or any store or
    /// decode error.
    pub async fn get_booking(&self, id: BookingId) -> Result<Arc<Booking>, CoreError> {
        let key = QueryKey::record(Collection::Bookings, id.into_inner());
        if let Some(Cached::Booking(booking)) = self.cache.get(&key).await {
            return Ok(booking);
        }

        let booking = Arc::new(self.load(id).await?);
        self.cache
            .set(key, Cached::Booking(Arc::clone(&booking)))
            .await;
        Ok(booking)
    }

    /// Validate, price and store a new booking as `unconfirmed`.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`] for a malformed email, a stay or party outside
    ///   the hotel's bounds or the cabin's capacity, or a price that cannot
    ///   be computed. Nothing is written.
    /// - [`CoreError::Store`] if a read or the insert fails.
    pub async fn create_booking(&self, draft: BookingDraft) -> Result<Booking, CoreError> {
        if !draft.guest.email.validate_email() {
            return Err(ValidationError::InvalidEmail(draft.guest.email).into());
        }
        let num_guests = fields::resolve_count(Field::NumGuests, draft.num_guests)?;
        let stay = StayRange::new(draft.start_date, draft.end_date);
        let nights = stay.nights()?;

        let settings = self.settings().await?;
        pricing::check_stay(&settings, nights, num_guests)?;

        let cabin: Cabin = decode(
            "cabin",
            self.store
                .fetch_record(Collection::Cabins, draft.cabin_id.into_inner())
                .await?,
        )?;
        if num_guests > cabin.max_capacity {
            return Err(ValidationError::TooManyGuests {
                guests: num_guests,
                max: cabin.max_capacity,
            }
            .into());
        }

        let price = pricing::compute_price(&PriceQuote {
            rate: CabinRate::from(&cabin),
            stay,
            num_guests,
            has_breakfast: draft.has_breakfast,
            breakfast_price: settings.breakfast_price,
        })?;

        let new = NewBooking {
            start_date: draft.start_date,
            end_date: draft.end_date,
            num_nights: price.nights,
            num_guests,
            cabin_price: price.cabin_price,
            extras_price: price.extras_price,
            total_price: price.total_price,
            status: BookingStatus::Unconfirmed,
            has_breakfast: draft.has_breakfast,
            is_paid: draft.is_paid,
            observations: draft.observations,
            cabin_id: draft.cabin_id,
            guest_data: draft.guest,
        };
        let payload = serde_json::to_value(&new).map_err(StoreError::from)?;
        let row = self
            .store
            .create_record(Collection::Bookings, &payload)
            .await?;
        self.cache.invalidate_kind(Collection::Bookings).await;

        let booking: Booking = decode("booking", row)?;
        tracing::info!(
            booking_id = %booking.id,
            cabin_id = %booking.cabin_id,
            nights = booking.num_nights,
            total = %booking.total_price,
            "booking created"
        );
        Ok(booking)
    }

    /// Check a guest in and mark the stay paid. With `add_breakfast`, adds
    /// breakfast for the whole party and stay and re-derives the total.
    ///
    /// # Errors
    ///
    /// [`ValidationError::IllegalTransition`] unless the booking is
    /// `unconfirmed`; store and decode errors otherwise.
    pub async fn check_in(&self, id: BookingId, add_breakfast: bool) -> Result<Booking, CoreError> {
        let booking = self.load(id).await?;
        ensure_transition(booking.status, BookingStatus::CheckedIn)?;

        let mut patch = StatusPatch {
            status: Some(BookingStatus::CheckedIn),
            is_paid: Some(true),
            ..StatusPatch::default()
        };

        if add_breakfast && !booking.has_breakfast {
            let settings = self.settings().await?;
            let extras = pricing::breakfast_extras(
                settings.breakfast_price,
                booking.num_nights,
                booking.num_guests,
            )?;
            let total = booking
                .cabin_price
                .checked_add(extras)
                .ok_or(ValidationError::Overflow)?;
            patch.has_breakfast = Some(true);
            patch.extras_price = Some(extras);
            patch.total_price = Some(total);
        }

        let updated = self.patch(id, &patch).await?;
        tracing::info!(booking_id = %id, breakfast = updated.has_breakfast, "guest checked in");
        Ok(updated)
    }

    /// Check a guest out.
    ///
    /// # Errors
    ///
    /// [`ValidationError::IllegalTransition`] unless the booking is
    /// `checked-in`; store and decode errors otherwise.
    pub async fn check_out(&self, id: BookingId) -> Result<Booking, CoreError> {
        let booking = self.load(id).await?;
        ensure_transition(booking.status, BookingStatus::CheckedOut)?;

        let updated = self
            .patch(
                id,
                &StatusPatch {
                    status: Some(BookingStatus::CheckedOut),
                    ..StatusPatch::default()
                },
            )
            .await?;
        tracing::info!(booking_id = %id, "guest checked out");
        Ok(updated)
    }

    /// Delete a booking.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the delete is refused.
    pub async fn delete_booking(&self, id: BookingId) -> Result<(), CoreError> {
        self.store
            .delete_record(Collection::Bookings, id.into_inner())
            .await?;
        self.cache.invalidate_kind(Collection::Bookings).await;
        tracing::info!(booking_id = %id, "booking deleted");
        Ok(())
    }

    async fn load(&self, id: BookingId) -> Result<Booking, CoreError> {
        let row = self
            .store
            .fetch_record(Collection::Bookings, id.into_inner())
            .await?;
        decode("booking", row)
    }

    async fn patch(&self, id: BookingId, patch: &StatusPatch) -> Result<Booking, CoreError> {
        let payload = serde_json::to_value(patch).map_err(StoreError::from)?;
        let row = self
            .store
            .update_record(Collection::Bookings, id.into_inner(), &payload)
            .await?;
        self.cache.invalidate_kind(Collection::Bookings).await;
        decode("booking", row)
    }
}

/// Allow only the single forward step from `from` to `to`.
fn ensure_transition(from: BookingStatus, to: BookingStatus) -> Result<(), ValidationError> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(ValidationError::IllegalTransition { from, to })
    }
}
