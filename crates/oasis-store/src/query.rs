//! Read queries and their results.
//!
//! A [`RecordQuery`] is the store-level form of a window: filter, sort and
//! an inclusive row range. Records travel as JSON objects; typed decoding is
//! left to the caller.

use oasis_types::{Filter, Sort};
use serde_json::Value;

use crate::error::StoreError;

/// A raw record as returned by the store (a JSON object).
pub type Record = Value;

/// Inclusive, zero-based row range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowRange {
    /// First row index.
    pub from: u64,
    /// Last row index (inclusive).
    pub to: u64,
}

impl RowRange {
    /// Row range covering 1-indexed `page` at `page_size` rows per page.
    ///
    /// Returns `None` for page 0, a zero page size, or on overflow.
    pub fn for_page(page: u32, page_size: u32) -> Option<Self> {
        let size = u64::from(page_size);
        let from = u64::from(page.checked_sub(1)?).checked_mul(size)?;
        let to = from.checked_add(size.checked_sub(1)?)?;
        Some(Self { from, to })
    }
}

/// A filtered, sorted, optionally ranged read of one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RecordQuery {
    /// Row filter.
    pub filter: Filter,
    /// Ordering, or store order when `None`.
    pub sort: Option<Sort>,
    /// Row window, or every matching row when `None`.
    pub range: Option<RowRange>,
}

impl RecordQuery {
    /// Query every row of a collection.
    pub fn all() -> Self {
        Self::default()
    }
}

/// One window of rows plus the total number of rows matching the filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPage {
    /// Rows inside the requested range.
    pub rows: Vec<Record>,
    /// Total matching rows, ignoring the range.
    pub count: u64,
}

/// Extract the numeric `id` column from a record.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if the record has no integer `id`.
pub fn record_id(record: &Record) -> Result<i64, StoreError> {
    record
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| StoreError::Malformed("record has no integer id".to_owned()))
}
