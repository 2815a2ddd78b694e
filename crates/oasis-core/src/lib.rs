//! Mutation orchestration, pricing, and cached paging for the Oasis
//! back-office.
//!
//! This crate sits between the operator-facing surface and the remote
//! store. It validates drafts, derives prices, runs two-phase saves with a
//! compensating rollback, and serves reads through a per-session cache
//! with adjacent-page prefetch.
//!
//! # Modules
//!
//! - [`bookings`] -- Booking lifecycle: create, check in, check out, delete.
//! - [`cabins`] -- Cabin catalog reads, saves and deletes.
//! - [`cache`] -- Keyed query cache with namespace invalidation.
//! - [`config`] -- Configuration loading from `oasis-desk.yaml`.
//! - [`error`] -- Validation, rollback and union error types.
//! - [`fields`] -- Defaults and minimums for numeric form fields.
//! - [`pager`] -- Paginated booking reads with prefetch.
//! - [`pricing`] -- Derived booking price.
//! - [`session`] -- One operator session wiring the services together.
//! - [`upsert`] -- Two-phase cabin save with compensating delete.
//! - [`window`] -- Booking list filter, sort and page.

pub mod bookings;
pub mod cabins;
pub mod cache;
pub mod config;
pub mod error;
pub mod fields;
pub mod pager;
pub mod pricing;
pub mod session;
pub mod upsert;
pub mod window;

pub use bookings::{BookingDesk, BookingDraft};
pub use cabins::CabinCatalog;
pub use cache::{CacheEntry, Cached, QueryCache, QueryKey, SessionCache, Ticket};
pub use config::{ConfigError, DeskConfig};
pub use error::{Compensation, CoreError, RollbackError, ValidationError};
pub use pager::{BookingPage, BookingPager, Fetched, PageView, Warmup};
pub use pricing::{CabinRate, PriceBreakdown, PriceQuote, StayRange, compute_price};
pub use session::Session;
pub use upsert::{CabinDraft, CabinUpsert, ImageSource, ImageUpload, UpsertMode};
pub use window::WindowState;
