//! Enumeration types for the Oasis back-office.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Booking status
// ---------------------------------------------------------------------------

/// Where a booking sits in its stay lifecycle.
///
/// A booking moves strictly forward:
/// `Unconfirmed -> CheckedIn -> CheckedOut`. No state is ever skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum BookingStatus {
    /// Reserved but the guest has not arrived.
    Unconfirmed,
    /// Guest has arrived and paid.
    CheckedIn,
    /// Guest has left.
    CheckedOut,
}

impl BookingStatus {
    /// Wire representation used by the store and in window filters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unconfirmed => "unconfirmed",
            Self::CheckedIn => "checked-in",
            Self::CheckedOut => "checked-out",
        }
    }

    /// The only status this one may move to, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Unconfirmed => Some(Self::CheckedIn),
            Self::CheckedIn => Some(Self::CheckedOut),
            Self::CheckedOut => None,
        }
    }
}

impl core::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Store namespaces
// ---------------------------------------------------------------------------

/// A record collection (table) in the hosted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// The cabin catalog.
    Cabins,
    /// Guest bookings.
    Bookings,
    /// The singleton hotel settings row.
    Settings,
}

impl Collection {
    /// Table name on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cabins => "cabins",
            Self::Bookings => "bookings",
            Self::Settings => "settings",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A blob storage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    /// Public cabin photos.
    CabinImages,
}

impl Bucket {
    /// Bucket name on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CabinImages => "cabin-images",
        }
    }
}

impl core::fmt::Display for Bucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names_are_kebab_case() {
        let json = serde_json::to_string(&BookingStatus::CheckedIn).ok();
        assert_eq!(json.as_deref(), Some("\"checked-in\""));

        let parsed: Result<BookingStatus, _> = serde_json::from_str("\"checked-out\"");
        assert_eq!(parsed.ok(), Some(BookingStatus::CheckedOut));
    }

    #[test]
    fn status_never_skips_a_state() {
        assert_eq!(BookingStatus::Unconfirmed.next(), Some(BookingStatus::CheckedIn));
        assert_eq!(BookingStatus::CheckedIn.next(), Some(BookingStatus::CheckedOut));
        assert_eq!(BookingStatus::CheckedOut.next(), None);
    }

    #[test]
    fn display_matches_serde() {
        for status in [
            BookingStatus::Unconfirmed,
            BookingStatus::CheckedIn,
            BookingStatus::CheckedOut,
        ] {
            let json = serde_json::to_string(&status).unwrap_or_default();
            assert_eq!(json, format!("\"{status}\""));
        }
    }
}
