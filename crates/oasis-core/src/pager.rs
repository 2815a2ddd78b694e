//! Paginated booking reads with adjacent-page prefetch.
//!
//! [`BookingPager::fetch`] resolves the requested page (cache first, then
//! store) before returning, and schedules background warms of the pages on
//! either side so that paging forward or back is served from the cache.
//!
//! Warms are best effort:
//!
//! - a page already cached or already being warmed is skipped;
//! - results are published with [`QueryCache::offer`](crate::cache::QueryCache::offer),
//!   so a warm never overwrites a fresher entry or refills a namespace
//!   invalidated while it was in flight;
//! - failures are logged at `debug` and dropped.

use std::sync::Arc;

use futures::future::join_all;
use oasis_store::{RecordQuery, RowRange, StoreBackend};
use oasis_types::{Booking, Collection};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::cache::{Cached, SessionCache};
use crate::error::{CoreError, ValidationError, decode};
use crate::window::WindowState;

/// Rows per page when configuration does not say otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One window of bookings plus the total matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingPage {
    /// Bookings on this page.
    pub rows: Vec<Booking>,
    /// Bookings matching the filter across all pages.
    pub count: u64,
}

/// A resolved page as shown to the caller.
#[derive(Debug, Clone)]
pub struct PageView {
    /// The window that was read.
    pub window: WindowState,
    /// Rows and total.
    pub page: Arc<BookingPage>,
    /// `ceil(count / page_size)`.
    pub page_count: u64,
    /// Whether the page came from the cache.
    pub from_cache: bool,
}

/// Background warms scheduled by a fetch.
///
/// Dropping the handle detaches the tasks; they still run to completion.
#[derive(Debug, Default)]
pub struct Warmup {
    pages: Vec<u32>,
    handles: Vec<JoinHandle<()>>,
}

impl Warmup {
    /// Pages a warm was started for, next page first.
    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    /// Wait for every scheduled warm to finish.
    pub async fn settle(self) {
        for result in join_all(self.handles).await {
            if let Err(e) = result {
                tracing::debug!(error = %e, "prefetch task ended abnormally");
            }
        }
    }
}

/// The result of [`BookingPager::fetch`].
#[derive(Debug)]
pub struct Fetched {
    /// The requested page.
    pub view: PageView,
    /// Handle over the adjacent-page warms.
    pub warmup: Warmup,
}

/// Reads booking pages through the session cache.
#[derive(Debug, Clone)]
pub struct BookingPager {
    store: StoreBackend,
    cache: Arc<SessionCache>,
    page_size: u32,
}

impl BookingPager {
    /// Create a pager. A zero `page_size` falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn new(store: StoreBackend, cache: Arc<SessionCache>, page_size: u32) -> Self {
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self {
            store,
            cache,
            page_size,
        }
    }

    /// Rows per page.
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Parse key/value window parameters and fetch that page.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidWindow`] for malformed parameters, otherwise
    /// as [`fetch`](Self::fetch).
    pub async fn fetch_params<I, K, V>(&self, params: I) -> Result<Fetched, CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let window = WindowState::from_params(params)?;
        self.fetch(&window).await
    }

    /// Fetch one page of bookings and warm its neighbours.
    ///
    /// # Errors
    ///
    /// Returns the store or decode error of the current page read. Warm
    /// failures are never reported.
    pub async fn fetch(&self, window: &WindowState) -> Result<Fetched, CoreError> {
        let key = window.key();

        let (page, from_cache) = match self.cache.get(&key).await {
            Some(Cached::BookingPage(page)) => (page, true),
            _ => {
                let page = Arc::new(load(&self.store, window, self.page_size).await?);
                self.cache
                    .set(key, Cached::BookingPage(Arc::clone(&page)))
                    .await;
                (page, false)
            }
        };

        let page_count = page_count(page.count, self.page_size);
        tracing::debug!(
            page = window.page,
            page_count,
            count = page.count,
            from_cache,
            "booking page resolved"
        );

        let mut warmup = Warmup::default();
        if u64::from(window.page) < page_count {
            if let Some(next) = window.page.checked_add(1) {
                self.warm(window.with_page(next), &mut warmup).await;
            }
        }
        if window.page > 1 {
            if let Some(previous) = window.page.checked_sub(1) {
                self.warm(window.with_page(previous), &mut warmup).await;
            }
        }

        Ok(Fetched {
            view: PageView {
                window: window.clone(),
                page,
                page_count,
                from_cache,
            },
            warmup,
        })
    }

    async fn warm(&self, window: WindowState, warmup: &mut Warmup) {
        let key = window.key();
        let Some(ticket) = self.cache.claim(&key).await else {
            return;
        };

        let store = self.store.clone();
        let cache = Arc::clone(&self.cache);
        let page_size = self.page_size;
        let page = window.page;

        let handle = tokio::spawn(async move {
            match load(&store, &window, page_size).await {
                Ok(loaded) => {
                    let stored = cache
                        .offer(key, Cached::BookingPage(Arc::new(loaded)), ticket)
                        .await;
                    tracing::debug!(page, stored, "prefetch finished");
                }
                Err(e) => {
                    cache.release(&key).await;
                    tracing::debug!(page, error = %e, "prefetch failed");
                }
            }
        });

        warmup.pages.push(page);
        warmup.handles.push(handle);
    }
}

/// Number of pages needed for `count` rows.
pub fn page_count(count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(u64::from(page_size))
}

async fn load(
    store: &StoreBackend,
    window: &WindowState,
    page_size: u32,
) -> Result<BookingPage, CoreError> {
    let range = RowRange::for_page(window.page, page_size).ok_or_else(|| {
        ValidationError::InvalidWindow(format!("page {} is out of range", window.page))
    })?;
    let query = RecordQuery {
        filter: window.filter.clone(),
        sort: Some(window.sort.clone()),
        range: Some(range),
    };

    let result = store.query_records(Collection::Bookings, &query).await?;
    let rows = result
        .rows
        .into_iter()
        .map(|row| decode::<Booking>("booking", row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BookingPage {
        rows,
        count: result.count,
    })
}
