//! Remote store client for the Oasis back-office.
//!
//! The hosted backend exposes simple record CRUD and blob storage. This crate
//! wraps both behind one [`StoreBackend`] handle whose calls are
//! all-or-nothing from the caller's view. No call is retried here; retry is a
//! policy decision for the layer above.
//!
//! # Architecture
//!
//! ```text
//! oasis-core
//!     |
//!     +-- StoreBackend (enum dispatch)
//!         |-- RestStore    (PostgREST records + object storage over reqwest)
//!         +-- MemoryStore  (in-process tables, journal, fault plan)
//! ```
//!
//! # Modules
//!
//! - [`backend`] -- The dispatching [`StoreBackend`] handle
//! - [`rest`] -- Hosted REST backend
//! - [`memory`] -- In-process backend
//! - [`query`] -- Windowed read queries and results
//! - [`config`] -- Connection settings
//! - [`error`] -- Shared error types

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod query;
pub mod rest;

// Re-export primary types for convenience.
pub use backend::StoreBackend;
pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::{MemoryStore, StoreCall, StoreOp};
pub use query::{Record, RecordPage, RecordQuery, RowRange, record_id};
pub use rest::RestStore;
