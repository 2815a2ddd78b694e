//! One operator session: a store handle plus the services sharing its cache.

use std::sync::Arc;

use oasis_store::{RestStore, StoreBackend};

use crate::bookings::BookingDesk;
use crate::cabins::CabinCatalog;
use crate::cache::SessionCache;
use crate::config::DeskConfig;
use crate::error::CoreError;
use crate::pager::BookingPager;

/// Services for one session, all reading through the same [`SessionCache`].
#[derive(Debug, Clone)]
pub struct Session {
    store: StoreBackend,
    cache: Arc<SessionCache>,
    /// Paginated booking list.
    pub pager: BookingPager,
    /// Cabin catalog and cabin saves.
    pub cabins: CabinCatalog,
    /// Booking lifecycle.
    pub bookings: BookingDesk,
}

impl Session {
    /// Build a session over `store` with a fresh cache.
    pub fn new(store: StoreBackend, page_size: u32) -> Self {
        let cache = Arc::new(SessionCache::new());
        Self {
            pager: BookingPager::new(store.clone(), Arc::clone(&cache), page_size),
            cabins: CabinCatalog::new(store.clone(), Arc::clone(&cache)),
            bookings: BookingDesk::new(store.clone(), Arc::clone(&cache)),
            store,
            cache,
        }
    }

    /// Build a session against the hosted store named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the store client cannot be built.
    pub fn connect(config: &DeskConfig) -> Result<Self, CoreError> {
        let store = RestStore::connect(&config.store_config())?;
        Ok(Self::new(store.into(), config.paging.page_size))
    }

    /// The underlying store handle.
    pub const fn store(&self) -> &StoreBackend {
        &self.store
    }

    /// The shared session cache.
    pub const fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }
}
