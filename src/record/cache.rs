//! A grow-only, process-wide map from property name to a shared
//! [`NotificationRecord`].
//!
//! # Closed-world assumption
//!
//! Entries are never evicted. The cache is sized by the number of distinct
//! property names ever notified, which is bounded only when names come from a
//! small, static set (setter-supplied `&'static str` constants). Feeding it an
//! unbounded, dynamically growing set of names grows memory without limit.
//!
//! # Concurrency
//!
//! The map sits behind a [`ShardedLock`]: a lookup of an existing name takes a
//! read lock on the calling thread's shard only, so concurrent dispatches on
//! unrelated entities do not contend. Only the first notification of a new
//! name takes the write lock. Guards are released before the record is
//! returned, so observers never run while the lock is held.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError};

use crossbeam_utils::sync::ShardedLock;

use super::NotificationRecord;

/// A concurrent get-or-insert cache of immutable change records.
#[derive(Debug, Default)]
pub struct RecordCache {
    records: ShardedLock<HashMap<&'static str, Arc<NotificationRecord>>>,
}

static GLOBAL: OnceLock<RecordCache> = OnceLock::new();

impl RecordCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache shared by every [`CachedNotifier`] that was not
    /// bound to another cache.
    ///
    /// [`CachedNotifier`]: crate::notify::CachedNotifier
    pub fn global() -> &'static RecordCache {
        GLOBAL.get_or_init(RecordCache::new)
    }

    /// Returns the record for `name`, constructing and inserting it on first use.
    ///
    /// Racing callers for the same absent name all receive the single record
    /// that ended up in the map.
    pub fn get_or_insert(&self, name: &'static str) -> Arc<NotificationRecord> {
        if let Some(record) = self.get(name) {
            return record;
        }

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records.entry(name).or_insert_with(|| {
            tracing::trace!(property = name, "caching notification record");
            Arc::new(NotificationRecord::new(name))
        });
        Arc::clone(record)
    }

    /// Returns the cached record for `name`, if any. Never inserts.
    pub fn get(&self, name: &str) -> Option<Arc<NotificationRecord>> {
        // Writers only ever insert whole entries, so a poisoned map is still consistent.
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(name).map(Arc::clone)
    }

    /// Returns `true` if a record for `name` has been cached.
    pub fn contains(&self, name: &str) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Number of distinct names cached so far.
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_insert_populates_lazily() {
        let cache = RecordCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("X").is_none());

        let record = cache.get_or_insert("X");
        assert_eq!(record.property_name(), "X");
        assert!(cache.contains("X"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_name_returns_same_record() {
        let cache = RecordCache::new();
        let a = cache.get_or_insert("Y");
        let b = cache.get_or_insert("Y");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_names_never_alias() {
        let cache = RecordCache::new();
        for name in ["X", "Y", "Z"] {
            assert_eq!(cache.get_or_insert(name).property_name(), name);
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("Z").map(|r| r.property_name().to_owned()), Some("Z".to_owned()));
    }

    #[test]
    fn test_concurrent_population_agrees() {
        const THREADS: usize = 8;
        const NAMES: [&str; 4] = ["Alpha", "Beta", "Gamma", "Delta"];

        let cache = RecordCache::new();
        let per_thread: Vec<Vec<Arc<NotificationRecord>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|t| {
                    let cache = &cache;
                    scope.spawn(move || {
                        (0..NAMES.len())
                            .map(|i| cache.get_or_insert(NAMES[(i + t) % NAMES.len()]))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(cache.len(), NAMES.len());
        for records in &per_thread {
            for record in records {
                let cached = cache.get(record.property_name()).unwrap();
                assert_eq!(*cached, **record);
            }
        }
    }

    #[test]
    fn test_global_is_a_singleton() {
        let a = RecordCache::global() as *const RecordCache;
        let b = RecordCache::global() as *const RecordCache;
        assert_eq!(a, b);
    }
}
