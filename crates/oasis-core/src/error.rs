//! Error taxonomy for the orchestration layer.
//!
//! - [`ValidationError`] -- semantic input problems, raised before any store
//!   call.
//! - [`StoreError`] -- passed through from the store client untouched.
//! - [`RollbackError`] -- an asset write failed after the record write
//!   committed, and the record write was compensated.
//!
//! [`CoreError`] is the union surfaced by every public operation.

use oasis_store::StoreError;
use oasis_types::BookingStatus;
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Semantic validation failures. None of these ever reach the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The stay does not cover at least one night.
    #[error("stay must end at least one night after it starts")]
    InvalidRange,

    /// The cabin's discount exceeds its regular price, so the nightly rate
    /// would be negative.
    #[error("cabin rate is negative: regular price {regular_price}, discount {discount}")]
    InvalidCabin {
        /// Nightly rate before discount.
        regular_price: Decimal,
        /// Nightly discount.
        discount: Decimal,
    },

    /// A count that must be at least one was zero.
    #[error("{field} must be positive")]
    NonPositive {
        /// Wire name of the field.
        field: &'static str,
    },

    /// A value fell under its configured minimum.
    #[error("{field} must be at least {min}")]
    BelowMinimum {
        /// Wire name of the field.
        field: &'static str,
        /// The minimum from the field rule table.
        min: Decimal,
    },

    /// A cabin draft offers a discount larger than its price.
    #[error("discount {discount} must not exceed regular price {regular_price}")]
    DiscountExceedsPrice {
        /// Nightly rate before discount.
        regular_price: Decimal,
        /// Nightly discount.
        discount: Decimal,
    },

    /// A new cabin was submitted without an image.
    #[error("an image is required when creating a cabin")]
    MissingImage,

    /// The uploaded file name is empty once path separators are removed.
    #[error("image file name is empty")]
    InvalidImageName,

    /// The stay is shorter than the hotel allows.
    #[error("stay of {nights} nights is below the minimum of {min}")]
    StayTooShort {
        /// Requested nights.
        nights: u32,
        /// Minimum nights.
        min: u32,
    },

    /// The stay is longer than the hotel allows.
    #[error("stay of {nights} nights is above the maximum of {max}")]
    StayTooLong {
        /// Requested nights.
        nights: u32,
        /// Maximum nights.
        max: u32,
    },

    /// More guests than the cabin or the hotel allows.
    #[error("{guests} guests exceeds the limit of {max}")]
    TooManyGuests {
        /// Requested guests.
        guests: u32,
        /// Applicable limit.
        max: u32,
    },

    /// The guest email is not shaped like an address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// A booking status change that skips or reverses a step.
    #[error("booking cannot move from {from} to {to}")]
    IllegalTransition {
        /// Current status.
        from: BookingStatus,
        /// Requested status.
        to: BookingStatus,
    },

    /// The window state (filter, sort, page) could not be parsed.
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Price arithmetic overflowed.
    #[error("price arithmetic overflowed")]
    Overflow,
}

// ---------------------------------------------------------------------------
// Rollback
// ---------------------------------------------------------------------------

/// What happened to the compensating delete.
#[derive(Debug)]
pub enum Compensation {
    /// The committed record was removed.
    Deleted,
    /// The compensating delete itself failed; the record may still exist.
    Failed(StoreError),
}

impl core::fmt::Display for Compensation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Deleted => f.write_str("record removed"),
            Self::Failed(e) => write!(f, "compensating delete failed: {e}"),
        }
    }
}

/// The asset write failed after the record write committed.
///
/// Carries the original failure and the outcome of the compensating delete.
/// A failed compensation is recorded here rather than raised, so it never
/// masks the primary cause.
#[derive(Debug, thiserror::Error)]
#[error("save rolled back: {cause} ({compensation})")]
pub struct RollbackError {
    /// The asset write failure that triggered the rollback.
    #[source]
    pub cause: StoreError,
    /// Outcome of the compensating delete.
    pub compensation: Compensation,
}

impl RollbackError {
    /// Whether the committed record was successfully removed.
    pub const fn compensated(&self) -> bool {
        matches!(self.compensation, Compensation::Deleted)
    }
}

// ---------------------------------------------------------------------------
// Union
// ---------------------------------------------------------------------------

/// Errors surfaced by the orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed semantic validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store refused or could not be reached.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A two-phase save failed in its second phase and was compensated.
    #[error(transparent)]
    Rollback(Box<RollbackError>),

    /// A store record did not decode into the expected type.
    #[error("failed to decode {what}: {source}")]
    Decode {
        /// What was being decoded.
        what: &'static str,
        /// The underlying decode error.
        source: serde_json::Error,
    },
}

impl From<RollbackError> for CoreError {
    fn from(e: RollbackError) -> Self {
        Self::Rollback(Box::new(e))
    }
}

/// Decode a store record into `T`, tagging failures with `what`.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    what: &'static str,
    record: serde_json::Value,
) -> Result<T, CoreError> {
    serde_json::from_value(record).map_err(|source| CoreError::Decode { what, source })
}
