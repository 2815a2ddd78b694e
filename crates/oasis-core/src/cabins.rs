//! Cabin catalog reads and writes.

use std::sync::Arc;

use oasis_store::{RecordQuery, StoreBackend};
use oasis_types::{Cabin, CabinId, Collection};

use crate::cache::{Cached, QueryKey, SessionCache};
use crate::error::{CoreError, decode};
use crate::upsert::{CabinDraft, CabinUpsert};

/// The cabin catalog, read unbounded and cached as one entry.
#[derive(Debug, Clone)]
pub struct CabinCatalog {
    store: StoreBackend,
    cache: Arc<SessionCache>,
}

impl CabinCatalog {
    /// Create a catalog over `store`, sharing `cache` with the session.
    pub const fn new(store: StoreBackend, cache: Arc<SessionCache>) -> Self {
        Self { store, cache }
    }

    /// Every cabin.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] or [`CoreError::Decode`] on a cache miss
    /// that fails to load.
    pub async fn list(&self) -> Result<Arc<Vec<Cabin>>, CoreError> {
        let key = QueryKey::all(Collection::Cabins);
        if let Some(Cached::Cabins(cabins)) = self.cache.get(&key).await {
            return Ok(cabins);
        }

        let page = self
            .store
            .query_records(Collection::Cabins, &RecordQuery::all())
            .await?;
        let cabins = Arc::new(
            page.rows
                .into_iter()
                .map(|row| decode::<Cabin>("cabin", row))
                .collect::<Result<Vec<_>, _>>()?,
        );
        self.cache.set(key, Cached::Cabins(Arc::clone(&cabins))).await;
        Ok(cabins)
    }

    /// One cabin, read directly from the store.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] (including `NotFound`) or
    /// [`CoreError::Decode`].
    pub async fn get(&self, id: CabinId) -> Result<Cabin, CoreError> {
        let row = self
            .store
            .fetch_record(Collection::Cabins, id.into_inner())
            .await?;
        decode("cabin", row)
    }

    /// Validate and save a cabin, uploading its image if a new one was
    /// picked.
    ///
    /// # Errors
    ///
    /// See [`CabinUpsert::plan`] and [`CabinUpsert::execute`].
    pub async fn save(&self, draft: CabinDraft) -> Result<Cabin, CoreError> {
        let upsert = CabinUpsert::plan(draft, &self.store)?;
        upsert.execute(&self.store, &self.cache).await
    }

    /// Delete a cabin.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the delete is refused.
    pub async fn delete(&self, id: CabinId) -> Result<(), CoreError> {
        self.store
            .delete_record(Collection::Cabins, id.into_inner())
            .await?;
        self.cache.invalidate_kind(Collection::Cabins).await;
        tracing::info!(cabin_id = %id, "cabin deleted");
        Ok(())
    }
}
