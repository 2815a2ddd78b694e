//! In-process store backend.
//!
//! Mirrors the REST backend's observable behavior closely enough to drive
//! the orchestration layer without a network: sequential ids, PATCH-style
//! updates, exact match counts, and silent deletes of missing rows.
//!
//! Two extras make it useful for tests and dry runs:
//!
//! - a **journal** of every attempted call, in order, so callers can assert
//!   which round-trips happened;
//! - a **fault plan**: [`MemoryStore::fail_next`] makes the next call of a
//!   given operation fail with [`StoreError::Injected`] without touching
//!   state.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use oasis_types::{Bucket, Collection, Filter, SortDirection};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::query::{Record, RecordPage, RecordQuery};

/// Base URL used to build public blob URLs for the memory backend.
const MEMORY_BASE_URL: &str = "memory://oasis";

/// The kind of a store call, used to target faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `create_record`.
    Create,
    /// `update_record`.
    Update,
    /// `delete_record`.
    Delete,
    /// `fetch_record`.
    Fetch,
    /// `query_records`.
    Query,
    /// `upload_blob`.
    Upload,
}

/// One journaled call against the memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// A record insert.
    Create {
        /// Target collection.
        collection: Collection,
    },
    /// A record patch.
    Update {
        /// Target collection.
        collection: Collection,
        /// Record id.
        id: i64,
    },
    /// A record delete.
    Delete {
        /// Target collection.
        collection: Collection,
        /// Record id.
        id: i64,
    },
    /// A single-record read.
    Fetch {
        /// Target collection.
        collection: Collection,
        /// Record id.
        id: i64,
    },
    /// A windowed read.
    Query {
        /// Target collection.
        collection: Collection,
        /// The query as issued.
        query: RecordQuery,
    },
    /// A blob upload.
    Upload {
        /// Target bucket.
        bucket: Bucket,
        /// Blob name.
        name: String,
    },
}

impl StoreCall {
    /// The operation kind of this call.
    pub const fn op(&self) -> StoreOp {
        match self {
            Self::Create { .. } => StoreOp::Create,
            Self::Update { .. } => StoreOp::Update,
            Self::Delete { .. } => StoreOp::Delete,
            Self::Fetch { .. } => StoreOp::Fetch,
            Self::Query { .. } => StoreOp::Query,
            Self::Upload { .. } => StoreOp::Upload,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: BTreeMap<Collection, BTreeMap<i64, Value>>,
    blobs: BTreeMap<(Bucket, String), Vec<u8>>,
    last_id: i64,
    journal: Vec<StoreCall>,
    faults: Vec<StoreOp>,
}

impl MemoryState {
    /// Journal `call`, then consume a matching fault if one is planned.
    fn enter(&mut self, call: StoreCall) -> Result<(), StoreError> {
        let op = call.op();
        self.journal.push(call);
        if let Some(pos) = self.faults.iter().position(|f| *f == op) {
            self.faults.remove(pos);
            return Err(StoreError::Injected(format!("{op:?} failed")));
        }
        Ok(())
    }

    fn next_id(&mut self) -> Result<i64, StoreError> {
        self.last_id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Malformed("id sequence exhausted".to_owned()))?;
        Ok(self.last_id)
    }
}

/// Shared in-memory store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail. Faults queue up when called repeatedly.
    pub async fn fail_next(&self, op: StoreOp) {
        self.state.lock().await.faults.push(op);
    }

    /// Every call attempted so far, oldest first.
    pub async fn journal(&self) -> Vec<StoreCall> {
        self.state.lock().await.journal.clone()
    }

    /// Forget the journal (e.g. after seeding).
    pub async fn clear_journal(&self) {
        self.state.lock().await.journal.clear();
    }

    /// All rows of a collection in id order.
    pub async fn records(&self, collection: Collection) -> Vec<Record> {
        self.state
            .lock()
            .await
            .tables
            .get(&collection)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Bytes stored under `name`, if any.
    pub async fn blob(&self, bucket: Bucket, name: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .await
            .blobs
            .get(&(bucket, name.to_owned()))
            .cloned()
    }

    /// Public URL a blob is served from once uploaded. Blobs are keyed by the
    /// raw name, so the name is not encoded.
    pub fn public_url(&self, bucket: Bucket, name: &str) -> String {
        format!(
            "{MEMORY_BASE_URL}/storage/v1/object/public/{}/{name}",
            bucket.as_str()
        )
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Insert one record and return it with its assigned `id`.
    pub async fn create_record(
        &self,
        collection: Collection,
        payload: &Value,
    ) -> Result<Record, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::Create { collection })?;

        let Value::Object(fields) = payload else {
            return Err(StoreError::Malformed("record payload must be an object".to_owned()));
        };

        let id = state.next_id()?;
        let mut row = fields.clone();
        row.insert("id".to_owned(), Value::from(id));
        row.insert("created_at".to_owned(), Value::from(Utc::now().to_rfc3339()));
        let row = Value::Object(row);

        state
            .tables
            .entry(collection)
            .or_default()
            .insert(id, row.clone());
        Ok(row)
    }

    /// Merge `payload` into the record with `id` and return the result.
    pub async fn update_record(
        &self,
        collection: Collection,
        id: i64,
        payload: &Value,
    ) -> Result<Record, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::Update { collection, id })?;

        let Value::Object(fields) = payload else {
            return Err(StoreError::Malformed("record payload must be an object".to_owned()));
        };

        let row = state
            .tables
            .get_mut(&collection)
            .and_then(|t| t.get_mut(&id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;

        for (key, value) in fields {
            if key != "id" {
                row.insert(key.clone(), value.clone());
            }
        }
        Ok(Value::Object(row.clone()))
    }

    /// Delete the record with `id`. Deleting a missing row succeeds.
    pub async fn delete_record(&self, collection: Collection, id: i64) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::Delete { collection, id })?;

        if let Some(table) = state.tables.get_mut(&collection) {
            table.remove(&id);
        }
        Ok(())
    }

    /// Read the record with `id`.
    pub async fn fetch_record(&self, collection: Collection, id: i64) -> Result<Record, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::Fetch { collection, id })?;

        state
            .tables
            .get(&collection)
            .and_then(|t| t.get(&id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))
    }

    /// Read a filtered, sorted window of rows plus the exact matching count.
    pub async fn query_records(
        &self,
        collection: Collection,
        query: &RecordQuery,
    ) -> Result<RecordPage, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::Query {
            collection,
            query: query.clone(),
        })?;

        let mut rows: Vec<Record> = state
            .tables
            .get(&collection)
            .map(|t| {
                t.values()
                    .filter(|row| matches_filter(row, &query.filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = &query.sort {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let count = u64::try_from(rows.len())
            .map_err(|e| StoreError::Malformed(format!("row count overflow: {e}")))?;

        let rows = match query.range {
            Some(range) => {
                let skip = usize::try_from(range.from).unwrap_or(usize::MAX);
                let take = range
                    .to
                    .checked_sub(range.from)
                    .and_then(|span| span.checked_add(1))
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or(0);
                rows.into_iter().skip(skip).take(take).collect()
            }
            None => rows,
        };

        Ok(RecordPage { rows, count })
    }

    // =========================================================================
    // Blobs
    // =========================================================================

    /// Store `bytes` as `name` in `bucket`. Fails if the name is taken.
    pub async fn upload_blob(
        &self,
        bucket: Bucket,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreCall::Upload {
            bucket,
            name: name.to_owned(),
        })?;

        let key = (bucket, name.to_owned());
        if state.blobs.contains_key(&key) {
            return Err(StoreError::Rejected {
                operation: "upload",
                status: 409,
                message: "The resource already exists".to_owned(),
            });
        }
        state.blobs.insert(key, bytes.to_vec());
        Ok(())
    }
}

/// Whether `row` passes `filter`. Values compare as text, like a URL filter.
fn matches_filter(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Equals { field, value } => row.get(field).is_some_and(|v| match v {
            Value::String(s) => s == value,
            other => other.to_string() == *value,
        }),
    }
}

/// Order two column values: numbers numerically, strings lexically, nulls last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .zip(y.as_f64())
            .and_then(|(x, y)| x.partial_cmp(&y))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
