//! Loaded-module caching.
//!
//! [`ModuleCache`] remembers the [`ViewFactory`] each route's loader produced,
//! so a deferred view is fetched once and reused on later navigations, the
//! way a dynamically imported module is. It is gated behind the `cache`
//! feature flag and uses the [`lru`] crate internally.
//!
//! Failed loads are never cached; the next navigation calls the loader again.
//!
//! [`CacheStats`] tracks hits, misses, evictions and invalidations.
//!
//! # Examples
//!
//! ```
//! use spa_navigator::cache::ModuleCache;
//! use spa_navigator::route::{Routable, ViewFactory};
//! use spa_navigator::view::{MountContext, View};
//! use spa_navigator::MountError;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Page { Foo }
//!
//! impl Routable for Page {
//!     const ALL: &'static [Self] = &[Page::Foo];
//!     fn path(self) -> &'static str { "/foo" }
//! }
//!
//! #[derive(Default)]
//! struct Foo;
//!
//! impl View for Foo {
//!     fn mount(&mut self, _cx: &mut MountContext<'_>) -> Result<(), MountError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut cache = ModuleCache::new();
//! assert!(cache.get(Page::Foo).is_none());
//! cache.insert(Page::Foo, ViewFactory::of::<Foo>());
//! assert!(cache.get(Page::Foo).is_some());
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::route::{Routable, ViewFactory};
use crate::router::DEFAULT_MODULE_CACHE_CAPACITY;
use crate::{debug_log, trace_log, warn_log};
use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;

/// Counters tracking cache effectiveness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: usize,
    /// Lookups that had to run the loader.
    pub misses: usize,
    /// Entries dropped to make room for new ones.
    pub evictions: usize,
    /// Number of full cache invalidations (via [`ModuleCache::clear`]).
    pub invalidations: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of loaded view factories, keyed by route.
pub struct ModuleCache<R: Routable> {
    modules: LruCache<R, ViewFactory>,
    stats: CacheStats,
}

impl<R: Routable> ModuleCache<R> {
    /// Create a cache with [`DEFAULT_MODULE_CACHE_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MODULE_CACHE_CAPACITY)
    }

    /// Create a cache holding at most `capacity` modules. A capacity of zero
    /// is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or_else(|| {
            warn_log!("Module cache capacity 0 is not allowed; using 1");
            NonZeroUsize::MIN
        });
        Self {
            modules: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up the loaded module for `route`. Updates hit/miss stats.
    pub fn get(&mut self, route: R) -> Option<ViewFactory> {
        if let Some(factory) = self.modules.get(&route) {
            self.stats.hits += 1;
            trace_log!("Module cache hit for {:?}", route);
            Some(factory.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Module cache miss for {:?}", route);
            None
        }
    }

    /// Remember the module loaded for `route`.
    pub fn insert(&mut self, route: R, factory: ViewFactory) {
        if let Some((evicted, _)) = self.modules.push(route, factory) {
            if evicted != route {
                self.stats.evictions += 1;
                debug_log!("Evicted module for {:?} to cache {:?}", evicted, route);
            }
        }
    }

    pub fn contains(&self, route: R) -> bool {
        self.modules.contains(&route)
    }

    /// Drop every cached module and increment the invalidation counter.
    pub fn clear(&mut self) {
        let len = self.modules.len();
        self.modules.clear();
        self.stats.invalidations += 1;
        debug_log!(
            "Module cache cleared: {} entries removed ({} total invalidations, hit rate: {:.1}%)",
            len,
            self.stats.invalidations,
            self.stats.hit_rate() * 100.0
        );
    }

    /// Return a reference to the current cache statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Reset all counters in [`CacheStats`] to zero.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.modules.cap().get()
    }
}

impl<R: Routable> Default for ModuleCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Routable> fmt::Debug for ModuleCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCache")
            .field("len", &self.modules.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats)
            .finish()
    }
}
