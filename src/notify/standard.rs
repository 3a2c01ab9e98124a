//! Baseline strategy: a fresh [`NotificationRecord`] per notification.

use core::fmt;

use super::observers::Observers;
use super::traits::Notifier;
use crate::record::NotificationRecord;

/// Builds a new record for every dispatch and drops it afterwards.
///
/// One heap allocation per notification; nothing is retained between
/// dispatches.
pub struct StandardNotifier<E> {
    observers: Observers<E>,
}

impl<E> StandardNotifier<E> {
    /// Creates a notifier with no observers.
    pub const fn new() -> Self {
        Self {
            observers: Observers::new(),
        }
    }
}

impl<E> Default for StandardNotifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Notifier<E> for StandardNotifier<E> {
    #[inline]
    fn observers(&self) -> &Observers<E> {
        &self.observers
    }

    #[inline]
    fn raise_changed(&self, sender: &E, name: &'static str) {
        if let Some(observers) = self.observers.snapshot() {
            let record = NotificationRecord::new(name);
            observers.deliver(sender, &record);
        }
    }
}

impl<E> fmt::Debug for StandardNotifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardNotifier")
            .field("observers", &self.observers)
            .finish()
    }
}
