//! Compiled Query Cache
//!
//! LRU cache of compile outcomes keyed by query string. Failures are cached
//! too, so a bad query is compiled (and reported) once per batch.

use crate::error::CompileError;
use crate::xpath::{compile, CompiledQuery};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Shared outcome of compiling one query string
pub type CompileOutcome = Arc<Result<CompiledQuery, CompileError>>;

/// Thread-safe compile cache; capacity 0 disables caching
pub struct QueryCache {
    entries: Option<Mutex<LruCache<String, CompileOutcome>>>,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        QueryCache {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Return the cached outcome for `query`, compiling it on a miss
    ///
    /// A poisoned lock is treated as a miss; compilation itself never runs
    /// while the lock is held.
    pub fn get_or_compile(&self, query: &str) -> CompileOutcome {
        let Some(entries) = &self.entries else {
            return Arc::new(compile(query));
        };

        if let Ok(mut guard) = entries.lock() {
            if let Some(hit) = guard.get(query) {
                return Arc::clone(hit);
            }
        }

        let outcome = Arc::new(compile(query));
        if let Ok(mut guard) = entries.lock() {
            guard.put(query.to_string(), Arc::clone(&outcome));
        }
        outcome
    }

    /// Number of cached outcomes
    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .and_then(|entries| entries.lock().ok().map(|guard| guard.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_same_outcome() {
        let cache = QueryCache::new(4);
        let first = cache.get_or_compile("//title");
        let second = cache.get_or_compile("//title");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failures_cached() {
        let cache = QueryCache::new(4);
        let outcome = cache.get_or_compile("[invalid-xpath");
        assert!(outcome.is_err());
        assert!(Arc::ptr_eq(&outcome, &cache.get_or_compile("[invalid-xpath")));
    }

    #[test]
    fn test_eviction() {
        let cache = QueryCache::new(2);
        let a = cache.get_or_compile("//a");
        cache.get_or_compile("//b");
        cache.get_or_compile("//c");
        assert_eq!(cache.len(), 2);
        assert!(!Arc::ptr_eq(&a, &cache.get_or_compile("//a")));
    }

    #[test]
    fn test_disabled() {
        let cache = QueryCache::new(0);
        assert!(cache.get_or_compile("//a").is_ok());
        assert!(cache.is_empty());
    }
}
