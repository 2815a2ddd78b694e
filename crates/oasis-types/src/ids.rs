//! Type-safe identifier wrappers around the store's `bigint` keys.
//!
//! The hosted backend assigns identifiers on insert, so these wrappers have
//! no generating constructor. They exist to keep a cabin id from being passed
//! where a booking id is expected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`i64`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(#[ts(type = "number")] pub i64);

        impl $name {
            /// Return the inner store key.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a cabin.
    CabinId
}

define_id! {
    /// Unique identifier for a booking.
    BookingId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_serializes_as_bare_number() {
        let json = serde_json::to_string(&CabinId(7)).ok();
        assert_eq!(json.as_deref(), Some("7"));

        let restored: Result<BookingId, _> = serde_json::from_str("42");
        assert_eq!(restored.ok(), Some(BookingId(42)));
    }

    #[test]
    fn id_display_matches_key() {
        assert_eq!(BookingId(19).to_string(), "19");
        assert_eq!(i64::from(CabinId(3)), 3);
    }
}
