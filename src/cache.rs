// Time-bounded holder for the loaded snapshot.
//
// A single-slot moka cache. Readers share the value through an `Arc`, so a
// snapshot handed out before an invalidation stays valid for whoever holds it.
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::debug;

pub struct TtlCache<T: Send + Sync + 'static> {
    inner: Cache<(), Arc<T>>,
}

impl<T: Send + Sync + 'static> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            inner: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Return the cached value if it is younger than the TTL, otherwise run
    /// `load` and cache its result.
    pub fn get_or_load<F>(&self, load: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        self.inner.get_with((), || {
            debug!("cache miss");
            Arc::new(load())
        })
    }

    /// Drop the cached value so the next `get_or_load` reloads.
    pub fn invalidate(&self) {
        debug!("cache invalidated");
        self.inner.invalidate(&());
    }

    /// The cached value, if one is stored and still fresh.
    pub fn current(&self) -> Option<Arc<T>> {
        self.inner.get(&())
    }
}
