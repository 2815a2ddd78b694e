//! Unified store handle over the REST and in-memory backends.
//!
//! Dispatch is a plain `match` over the two backends. Cloning a
//! [`StoreBackend`] is cheap and every clone talks to the same backend, so
//! background tasks can hold their own handle.

use oasis_types::{Bucket, Collection};
use serde_json::Value;

use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::query::{Record, RecordPage, RecordQuery};
use crate::rest::RestStore;

/// A remote store the orchestration layer can read from and write to.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Hosted REST backend.
    Rest(RestStore),
    /// In-process backend.
    Memory(MemoryStore),
}

impl StoreBackend {
    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rest(_) => "rest",
            Self::Memory(_) => "memory",
        }
    }

    /// Insert one record and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend refuses or cannot be reached.
    pub async fn create_record(
        &self,
        collection: Collection,
        payload: &Value,
    ) -> Result<Record, StoreError> {
        tracing::debug!(backend = self.name(), %collection, "create_record");
        match self {
            Self::Rest(store) => store.create_record(collection, payload).await,
            Self::Memory(store) => store.create_record(collection, payload).await,
        }
    }

    /// Patch the record with `id` and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend refuses or cannot be reached.
    pub async fn update_record(
        &self,
        collection: Collection,
        id: i64,
        payload: &Value,
    ) -> Result<Record, StoreError> {
        tracing::debug!(backend = self.name(), %collection, id, "update_record");
        match self {
            Self::Rest(store) => store.update_record(collection, id, payload).await,
            Self::Memory(store) => store.update_record(collection, id, payload).await,
        }
    }

    /// Delete the record with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend refuses or cannot be reached.
    pub async fn delete_record(&self, collection: Collection, id: i64) -> Result<(), StoreError> {
        tracing::debug!(backend = self.name(), %collection, id, "delete_record");
        match self {
            Self::Rest(store) => store.delete_record(collection, id).await,
            Self::Memory(store) => store.delete_record(collection, id).await,
        }
    }

    /// Read the record with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record exists.
    pub async fn fetch_record(&self, collection: Collection, id: i64) -> Result<Record, StoreError> {
        tracing::debug!(backend = self.name(), %collection, id, "fetch_record");
        match self {
            Self::Rest(store) => store.fetch_record(collection, id).await,
            Self::Memory(store) => store.fetch_record(collection, id).await,
        }
    }

    /// Read a filtered, sorted window of rows plus the exact matching count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend refuses or cannot be reached.
    pub async fn query_records(
        &self,
        collection: Collection,
        query: &RecordQuery,
    ) -> Result<RecordPage, StoreError> {
        tracing::debug!(backend = self.name(), %collection, ?query, "query_records");
        match self {
            Self::Rest(store) => store.query_records(collection, query).await,
            Self::Memory(store) => store.query_records(collection, query).await,
        }
    }

    /// Upload `bytes` as `name` into `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the upload is refused or cannot be sent.
    pub async fn upload_blob(
        &self,
        bucket: Bucket,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError> {
        tracing::debug!(
            backend = self.name(),
            %bucket,
            name,
            size = bytes.len(),
            "upload_blob"
        );
        match self {
            Self::Rest(store) => store.upload_blob(bucket, name, bytes, content_type).await,
            Self::Memory(store) => store.upload_blob(bucket, name, bytes).await,
        }
    }

    /// Public URL a blob under `name` is served from once uploaded.
    pub fn public_url(&self, bucket: Bucket, name: &str) -> String {
        match self {
            Self::Rest(store) => store.public_url(bucket, name),
            Self::Memory(store) => store.public_url(bucket, name),
        }
    }
}

impl From<RestStore> for StoreBackend {
    fn from(store: RestStore) -> Self {
        Self::Rest(store)
    }
}

impl From<MemoryStore> for StoreBackend {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}
