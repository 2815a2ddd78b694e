//! The form field rule table.
//!
//! Defaults and lower bounds for every numeric form field live here and
//! nowhere else. Cabin validation, booking validation, and the pricing
//! calculator all read from [`rule`], so a bound changes in one place.
//!
//! | Field | Default | Minimum |
//! |-------|---------|---------|
//! | `maxCapacity` | -- | 1 |
//! | `regularPrice` | -- | 1 |
//! | `discount` | 0 | 0 |
//! | `numGuests` | 1 | 1 |

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::ValidationError;

/// A numeric form field with a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Cabin sleeping capacity.
    MaxCapacity,
    /// Cabin nightly rate before discount.
    RegularPrice,
    /// Cabin nightly discount.
    Discount,
    /// Guests on a booking.
    NumGuests,
}

impl Field {
    /// Wire name of the field.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MaxCapacity => "maxCapacity",
            Self::RegularPrice => "regularPrice",
            Self::Discount => "discount",
            Self::NumGuests => "numGuests",
        }
    }
}

/// Default and lower bound for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Value used when the form leaves the field blank.
    pub default: Option<Decimal>,
    /// Smallest accepted value.
    pub min: Decimal,
}

/// Look up the rule for `field`.
pub const fn rule(field: Field) -> FieldRule {
    match field {
        Field::MaxCapacity | Field::RegularPrice => FieldRule {
            default: None,
            min: Decimal::ONE,
        },
        Field::Discount => FieldRule {
            default: Some(Decimal::ZERO),
            min: Decimal::ZERO,
        },
        Field::NumGuests => FieldRule {
            default: Some(Decimal::ONE),
            min: Decimal::ONE,
        },
    }
}

/// Resolve an optional submitted value against the field's default, then
/// check the minimum.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositive`] if the field has no default and
/// was left blank, or [`ValidationError::BelowMinimum`] if the value is under
/// the minimum.
pub fn resolve(field: Field, value: Option<Decimal>) -> Result<Decimal, ValidationError> {
    let rule = rule(field);
    let value = value.or(rule.default).ok_or(ValidationError::NonPositive {
        field: field.name(),
    })?;
    check(field, value)
}

/// Check `value` against the field's minimum.
///
/// # Errors
///
/// Returns [`ValidationError::BelowMinimum`] if the value is under the minimum.
pub fn check(field: Field, value: Decimal) -> Result<Decimal, ValidationError> {
    let min = rule(field).min;
    if value < min {
        return Err(ValidationError::BelowMinimum {
            field: field.name(),
            min,
        });
    }
    Ok(value)
}

/// [`resolve`] for whole-number fields.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn resolve_count(field: Field, value: Option<u32>) -> Result<u32, ValidationError> {
    let resolved = resolve(field, value.map(Decimal::from))?;
    resolved.to_u32().ok_or(ValidationError::Overflow)
}
