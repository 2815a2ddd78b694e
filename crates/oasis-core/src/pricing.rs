//! Derived booking price.
//!
//! The price of a stay is always computed here from its inputs and never
//! accepted from a client. The computation is pure and deterministic so the
//! same quote yields the same breakdown wherever it runs.
//!
//! ```text
//! nights       = round((end - start) / 1 day)
//! cabin_price  = (regular_price - discount) * nights
//! extras_price = has_breakfast ? breakfast_price * nights * guests : 0
//! total_price  = cabin_price + extras_price
//! ```
//!
//! All arithmetic is checked [`Decimal`] arithmetic; overflow is an error,
//! never a wrap.

use chrono::{DateTime, Utc};
use oasis_types::{Cabin, Settings};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValidationError;
use crate::fields::Field;

/// Seconds in one night of a stay.
const SECONDS_PER_NIGHT: i64 = 86_400;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The dates of a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    /// Arrival.
    pub start: DateTime<Utc>,
    /// Departure.
    pub end: DateTime<Utc>,
}

impl StayRange {
    /// Create a stay range. Ordering is checked by [`StayRange::nights`].
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whole nights in the stay, rounded half away from zero.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRange`] if the stay rounds to fewer
    /// than one night (including `end <= start`).
    pub fn nights(&self) -> Result<u32, ValidationError> {
        let seconds = self.end.signed_duration_since(self.start).num_seconds();
        if seconds <= 0 {
            return Err(ValidationError::InvalidRange);
        }

        let nights = Decimal::from(seconds)
            .checked_div(Decimal::from(SECONDS_PER_NIGHT))
            .ok_or(ValidationError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        if nights < Decimal::ONE {
            return Err(ValidationError::InvalidRange);
        }
        nights.to_u32().ok_or(ValidationError::Overflow)
    }
}

/// A cabin's nightly pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CabinRate {
    /// Nightly rate before discount.
    pub regular_price: Decimal,
    /// Nightly discount.
    pub discount: Decimal,
}

impl From<&Cabin> for CabinRate {
    fn from(cabin: &Cabin) -> Self {
        Self {
            regular_price: cabin.regular_price,
            discount: cabin.discount,
        }
    }
}

/// Everything the price of a stay depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// The booked cabin's rate.
    pub rate: CabinRate,
    /// Arrival and departure.
    pub stay: StayRange,
    /// Guests staying.
    pub num_guests: u32,
    /// Whether breakfast is included.
    pub has_breakfast: bool,
    /// Breakfast price per guest per night.
    pub breakfast_price: Decimal,
}

/// The derived price of a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Nights in the stay.
    pub nights: u32,
    /// Discounted rate times nights.
    pub cabin_price: Decimal,
    /// Breakfast and other extras.
    pub extras_price: Decimal,
    /// `cabin_price + extras_price`.
    pub total_price: Decimal,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute the price of a stay.
///
/// # Errors
///
/// - [`ValidationError::InvalidRange`] if the stay is shorter than one night.
/// - [`ValidationError::InvalidCabin`] if the discount exceeds the rate.
/// - [`ValidationError::NonPositive`] if there are no guests.
/// - [`ValidationError::Overflow`] if any product overflows.
pub fn compute_price(quote: &PriceQuote) -> Result<PriceBreakdown, ValidationError> {
    let nights = quote.stay.nights()?;
    if quote.num_guests == 0 {
        return Err(ValidationError::NonPositive {
            field: Field::NumGuests.name(),
        });
    }

    let cabin_price = cabin_price(quote.rate, nights)?;
    let extras_price = if quote.has_breakfast {
        breakfast_extras(quote.breakfast_price, nights, quote.num_guests)?
    } else {
        Decimal::ZERO
    };
    let total_price = cabin_price
        .checked_add(extras_price)
        .ok_or(ValidationError::Overflow)?;

    Ok(PriceBreakdown {
        nights,
        cabin_price,
        extras_price,
        total_price,
    })
}

/// Discounted nightly rate times nights.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCabin`] if the discount exceeds the rate.
pub fn cabin_price(rate: CabinRate, nights: u32) -> Result<Decimal, ValidationError> {
    let nightly = rate
        .regular_price
        .checked_sub(rate.discount)
        .ok_or(ValidationError::Overflow)?;
    if nightly < Decimal::ZERO {
        return Err(ValidationError::InvalidCabin {
            regular_price: rate.regular_price,
            discount: rate.discount,
        });
    }
    nightly
        .checked_mul(Decimal::from(nights))
        .ok_or(ValidationError::Overflow)
}

/// Breakfast price times nights times guests.
///
/// # Errors
///
/// Returns [`ValidationError::BelowMinimum`] for a negative breakfast price.
pub fn breakfast_extras(
    breakfast_price: Decimal,
    nights: u32,
    num_guests: u32,
) -> Result<Decimal, ValidationError> {
    if breakfast_price < Decimal::ZERO {
        return Err(ValidationError::BelowMinimum {
            field: "breakfastPrice",
            min: Decimal::ZERO,
        });
    }
    breakfast_price
        .checked_mul(Decimal::from(nights))
        .and_then(|v| v.checked_mul(Decimal::from(num_guests)))
        .ok_or(ValidationError::Overflow)
}

/// Check a stay against the hotel's booking bounds.
///
/// # Errors
///
/// Returns [`ValidationError::StayTooShort`], [`ValidationError::StayTooLong`]
/// or [`ValidationError::TooManyGuests`].
pub const fn check_stay(
    settings: &Settings,
    nights: u32,
    num_guests: u32,
) -> Result<(), ValidationError> {
    if nights < settings.min_booking_length {
        return Err(ValidationError::StayTooShort {
            nights,
            min: settings.min_booking_length,
        });
    }
    if nights > settings.max_booking_length {
        return Err(ValidationError::StayTooLong {
            nights,
            max: settings.max_booking_length,
        });
    }
    if num_guests > settings.max_guests_per_booking {
        return Err(ValidationError::TooManyGuests {
            guests: num_guests,
            max: settings.max_guests_per_booking,
        });
    }
    Ok(())
}
