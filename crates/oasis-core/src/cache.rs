//! Per-session keyed query cache.
//!
//! One [`QueryCache`] backs every read in a session. Keys are structured so
//! that a whole entity namespace (e.g. "all booking pages and booking
//! records") can be invalidated without enumerating filter, sort and page
//! combinations.
//!
//! # Key Patterns
//!
//! | Key | Example |
//! |-----|---------|
//! | `Listing { kind, filter, sort, page }` | bookings, status=checked-in, startDate-desc, page 2 |
//! | `Record { kind, id }` | booking 42 |
//!
//! # Freshness
//!
//! Every write stamps the entry with a version from a monotonic counter.
//! Prefetches take a [`Ticket`] *before* fetching and publish through
//! [`QueryCache::offer`], which refuses to replace an entry written after the
//! ticket was issued or to repopulate a namespace invalidated after it. Plain
//! [`QueryCache::set`] is last-write-wins.
//!
//! There is no eviction beyond explicit invalidation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use oasis_types::{Booking, Cabin, Collection, Filter, Settings, Sort};
use tokio::sync::RwLock;

use crate::pager::BookingPage;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// A structured cache key. `kind` is the invalidation namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// A (possibly windowed) read of a collection.
    Listing {
        /// Entity namespace.
        kind: Collection,
        /// Row filter.
        filter: Filter,
        /// Ordering, if any.
        sort: Option<Sort>,
        /// 1-indexed page, or `None` for an unbounded read.
        page: Option<u32>,
    },
    /// A single record.
    Record {
        /// Entity namespace.
        kind: Collection,
        /// Record id.
        id: i64,
    },
}

impl QueryKey {
    /// The unbounded listing of `kind`.
    pub const fn all(kind: Collection) -> Self {
        Self::Listing {
            kind,
            filter: Filter::All,
            sort: None,
            page: None,
        }
    }

    /// The single record `id` of `kind`.
    pub const fn record(kind: Collection, id: i64) -> Self {
        Self::Record { kind, id }
    }

    /// The invalidation namespace of this key.
    pub const fn kind(&self) -> Collection {
        match self {
            Self::Listing { kind, .. } | Self::Record { kind, .. } => *kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A cached payload plus when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value.
    pub payload: V,
    /// Wall-clock time the value was stored.
    pub fetched_at: DateTime<Utc>,
    version: u64,
}

/// A point in the cache's write order, taken before a background fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<QueryKey, CacheEntry<V>>,
    invalidated: HashMap<Collection, u64>,
    in_flight: HashSet<QueryKey>,
    clock: u64,
}

impl<V> CacheState<V> {
    fn tick(&mut self) -> u64 {
        self.clock = self.clock.saturating_add(1);
        self.clock
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// In-memory, per-session query cache.
#[derive(Debug)]
pub struct QueryCache<V> {
    state: RwLock<CacheState<V>>,
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> QueryCache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                invalidated: HashMap::new(),
                in_flight: HashSet::new(),
                clock: 0,
            }),
        }
    }

    /// The payload cached under `key`.
    pub async fn get(&self, key: &QueryKey) -> Option<V> {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .map(|e| e.payload.clone())
    }

    /// The full entry cached under `key`, including its fetch time.
    pub async fn entry(&self, key: &QueryKey) -> Option<CacheEntry<V>> {
        self.state.read().await.entries.get(key).cloned()
    }

    /// Whether anything is cached under `key`.
    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.state.read().await.entries.contains_key(key)
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Whether the cache holds nothing.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Store `payload` under `key`, replacing whatever was there.
    pub async fn set(&self, key: QueryKey, payload: V) {
        let mut state = self.state.write().await;
        let version = state.tick();
        state.in_flight.remove(&key);
        state.entries.insert(
            key,
            CacheEntry {
                payload,
                fetched_at: Utc::now(),
                version,
            },
        );
    }

    /// Take a ticket for a background fetch of any key.
    pub async fn ticket(&self) -> Ticket {
        Ticket(self.state.write().await.tick())
    }

    /// Claim `key` for a background fetch.
    ///
    /// Returns `None` if the key is already cached or another background
    /// fetch holds it. A claim is released by [`offer`](Self::offer) or
    /// [`release`](Self::release).
    pub async fn claim(&self, key: &QueryKey) -> Option<Ticket> {
        let mut state = self.state.write().await;
        if state.entries.contains_key(key) || state.in_flight.contains(key) {
            return None;
        }
        state.in_flight.insert(key.clone());
        Some(Ticket(state.tick()))
    }

    /// Drop a claim without publishing (e.g. the fetch failed).
    pub async fn release(&self, key: &QueryKey) {
        self.state.write().await.in_flight.remove(key);
    }

    /// Publish a background result fetched under `ticket`.
    ///
    /// Refused (returns `false`) when `key` holds an entry written after the
    /// ticket, or when its namespace was invalidated after the ticket.
    pub async fn offer(&self, key: QueryKey, payload: V, ticket: Ticket) -> bool {
        let mut state = self.state.write().await;
        state.in_flight.remove(&key);

        let newer_entry = state
            .entries
            .get(&key)
            .is_some_and(|e| e.version > ticket.0);
        let invalidated_since = state
            .invalidated
            .get(&key.kind())
            .is_some_and(|at| *at > ticket.0);
        if newer_entry || invalidated_since {
            return false;
        }

        let version = state.tick();
        state.entries.insert(
            key,
            CacheEntry {
                payload,
                fetched_at: Utc::now(),
                version,
            },
        );
        true
    }

    /// Drop every entry whose key matches `predicate`. Returns how many were
    /// dropped.
    pub async fn invalidate<P>(&self, predicate: P) -> usize
    where
        P: Fn(&QueryKey) -> bool,
    {
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state.entries.retain(|key, _| !predicate(key));
        before.saturating_sub(state.entries.len())
    }

    /// Drop every entry in the `kind` namespace and fence off background
    /// fetches that started before this call.
    pub async fn invalidate_kind(&self, kind: Collection) -> usize {
        let mut state = self.state.write().await;
        let at = state.tick();
        state.invalidated.insert(kind, at);
        let before = state.entries.len();
        state.entries.retain(|key, _| key.kind() != kind);
        let dropped = before.saturating_sub(state.entries.len());
        tracing::debug!(%kind, dropped, "cache namespace invalidated");
        dropped
    }
}

// ---------------------------------------------------------------------------
// Session payloads
// ---------------------------------------------------------------------------

/// Everything a session caches. Variants are reference-counted so reads
/// clone cheaply.
#[derive(Debug, Clone)]
pub enum Cached {
    /// One window of bookings.
    BookingPage(Arc<BookingPage>),
    /// A single booking.
    Booking(Arc<Booking>),
    /// The full cabin catalog.
    Cabins(Arc<Vec<Cabin>>),
    /// The settings row.
    Settings(Arc<Settings>),
}

/// The cache type shared by a session's services.
pub type SessionCache = QueryCache<Cached>;
