//! In-memory series cache with a time-to-live.
//!
//! Entries are keyed by [`SeriesRequest`] and expire `ttl` after insertion
//! (5 minutes by default). The cache is an explicit object the caller owns;
//! [`CachedProvider`] layers one over any [`SeriesProvider`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use super::provider::{DataError, SeriesProvider, SeriesRequest};
use crate::domain::Bar;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Time source for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    bars: Arc<Vec<Bar>>,
    inserted_at: Instant,
}

pub struct SeriesCache {
    entries: Mutex<HashMap<SeriesRequest, Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SeriesRequest, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_fresh(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }

    /// Fresh entry for the request; an expired one is removed.
    pub fn get(&self, request: &SeriesRequest) -> Option<Arc<Vec<Bar>>> {
        let now = self.clock.now();
        let mut entries = self.lock();
        match entries.get(request) {
            Some(entry) if self.is_fresh(entry, now) => Some(Arc::clone(&entry.bars)),
            Some(_) => {
                entries.remove(request);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, request: SeriesRequest, bars: Vec<Bar>) -> Arc<Vec<Bar>> {
        let bars = Arc::new(bars);
        let entry = Entry {
            bars: Arc::clone(&bars),
            inserted_at: self.clock.now(),
        };
        self.lock().insert(request, entry);
        bars
    }

    pub fn invalidate(&self, request: &SeriesRequest) -> bool {
        self.lock().remove(request).is_some()
    }

    /// Drop every entry for `symbol`. Returns how many were removed.
    pub fn invalidate_symbol(&self, symbol: &str) -> usize {
        let symbol = symbol.trim().to_uppercase();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|req, _| req.symbol != symbol);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Remove expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// A provider with a TTL cache in front of it.
pub struct CachedProvider<P> {
    inner: P,
    cache: SeriesCache,
}

impl<P: SeriesProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: SeriesCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Fetch from the provider and overwrite any cached entry.
    pub fn force_refresh(&self, request: &SeriesRequest) -> Result<Arc<Vec<Bar>>, DataError> {
        let bars = self.inner.fetch(request)?;
        Ok(self.cache.insert(request.clone(), bars))
    }

    pub fn get(&self, request: &SeriesRequest) -> Result<Arc<Vec<Bar>>, DataError> {
        if let Some(bars) = self.cache.get(request) {
            debug!(key = %request.cache_key(), "cache hit");
            return Ok(bars);
        }
        self.force_refresh(request)
    }
}

impl<P: SeriesProvider> SeriesProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError> {
        self.get(request).map(|bars| bars.as_ref().clone())
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
