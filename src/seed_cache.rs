//! Seed → [`RandomSource`] cache.
//!
//! Iterators built with the same seed share one random stream unless they opt
//! out with `skip_seed_cache`. Sharing means interleaved `next()` calls on two
//! such iterators perturb each other; callers that need isolation must ask for
//! a private source.

use crate::random::{RandomSource, SharedRandomSource};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static GLOBAL: SeedCache = SeedCache::new();
}

/// A cheaply clonable handle to a seed cache. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct SeedCache {
    entries: Rc<RefCell<HashMap<u64, SharedRandomSource>>>,
}

impl SeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default cache used by iterators that were not handed one.
    ///
    /// One cache exists per thread; the test harness runs each test on its
    /// own thread, so tests do not observe each other's streams.
    pub fn global() -> Self {
        GLOBAL.with(SeedCache::clone)
    }

    /// Returns the source for `seed`, creating it on first use.
    pub fn get(&self, seed: u64) -> SharedRandomSource {
        let mut entries = self.entries.borrow_mut();
        if let Some(source) = entries.get(&seed) {
            tracing::trace!(seed, "seed cache hit");
            return Rc::clone(source);
        }
        tracing::trace!(seed, "seed cache miss");
        let source = RandomSource::new(seed).shared();
        entries.insert(seed, Rc::clone(&source));
        source
    }

    /// Drops every cached source. Iterators already holding a source keep it.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_shares_instance() {
        let cache = SeedCache::new();
        let a = cache.get(42);
        let b = cache.get(42);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_creates_fresh_sources() {
        let cache = SeedCache::new();
        let first = cache.get(42);
        let before = first.borrow_mut().integer(0, 1_000_000);
        cache.clear();
        assert!(cache.is_empty());
        let second = cache.get(42);
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(second.borrow_mut().integer(0, 1_000_000), before);
    }

    #[test]
    fn test_global_handle_is_shared_within_thread() {
        let cache = SeedCache::global();
        cache.clear();
        let a = SeedCache::global().get(7);
        let b = cache.get(7);
        assert!(Rc::ptr_eq(&a, &b));
        cache.clear();
    }
}
