//! Shared type definitions for the Oasis hotel back-office.
//!
//! Every crate in the workspace speaks these types: the store client moves
//! them over the wire, the core validates and prices them, and the front-end
//! receives `TypeScript` mirrors generated by `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for store-assigned keys
//! - [`enums`] -- Booking status, collections and buckets
//! - [`structs`] -- Cabin, booking and settings records
//! - [`window`] -- Filter and sort descriptors for windowed reads

pub mod enums;
pub mod ids;
pub mod structs;
pub mod window;

// Re-export all public types at crate root for convenience.
pub use enums::{BookingStatus, Bucket, Collection};
pub use ids::{BookingId, CabinId};
pub use structs::{Booking, Cabin, GuestData, NewBooking, Settings};
pub use window::{Filter, Sort, SortDirection};
