// src/cache.rs - LRU cache for per-term match results

use lru::LruCache;
use std::num::NonZeroUsize;

/// Bounded LRU cache mapping normalized search terms to match lists.
///
/// Keys are lower-cased internally, so `get("Paris")` and `get("paris")`
/// address the same entry. A cached *empty* list is still a hit: it means the
/// source was already asked for that term and returned nothing, so the engine
/// must not ask again.
///
/// The cache is owned by a single engine instance and mutated only on the
/// engine's thread, so no interior locking is needed.
#[derive(Debug)]
pub struct TermCache<T> {
    entries: LruCache<String, Vec<T>>,
}

impl<T> TermCache<T> {
    /// Create a cache holding at most `capacity` terms.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).expect("capacity must be > 0")),
        }
    }

    /// Look up the match list for a term. Refreshes the entry's LRU position.
    pub fn get(&mut self, term: &str) -> Option<&[T]> {
        self.entries.get(&term.to_lowercase()).map(Vec::as_slice)
    }

    /// Store the match list computed for a term, evicting the least recently
    /// used entry if the cache is full.
    pub fn put(&mut self, term: &str, matches: Vec<T>) {
        self.entries.put(term.to_lowercase(), matches);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
