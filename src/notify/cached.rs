//! Cached strategy: one shared record per distinct property name.

use core::fmt;

use super::observers::Observers;
use super::traits::Notifier;
use crate::record::RecordCache;

/// Fetches records from a [`RecordCache`], so allocation is proportional to
/// the number of distinct property names rather than to the number of
/// notifications.
///
/// Every cached notifier bound to the same cache shares its records, across
/// entities of any type and across threads. The cache never evicts: see the
/// closed-world note on [`RecordCache`] before using this with dynamically
/// generated names.
pub struct CachedNotifier<E> {
    observers: Observers<E>,
    cache: &'static RecordCache,
}

impl<E> CachedNotifier<E> {
    /// Creates a notifier backed by [`RecordCache::global`].
    pub fn new() -> Self {
        Self::with_cache(RecordCache::global())
    }

    /// Creates a notifier backed by `cache`.
    pub fn with_cache(cache: &'static RecordCache) -> Self {
        Self {
            observers: Observers::new(),
            cache,
        }
    }

    /// The cache records are fetched from.
    pub fn cache(&self) -> &'static RecordCache {
        self.cache
    }
}

impl<E> Default for CachedNotifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Notifier<E> for CachedNotifier<E> {
    #[inline]
    fn observers(&self) -> &Observers<E> {
        &self.observers
    }

    #[inline]
    fn raise_changed(&self, sender: &E, name: &'static str) {
        if let Some(observers) = self.observers.snapshot() {
            let record = self.cache.get_or_insert(name);
            observers.deliver(sender, &*record);
        }
    }
}

impl<E> fmt::Debug for CachedNotifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedNotifier")
            .field("observers", &self.observers)
            .field("cached_names", &self.cache.len())
            .finish()
    }
}
