//! Property-change notification: the [`Bindable`] base contract and the three
//! record strategies.
//!
//! | Strategy | Record per dispatch | Retained state |
//! |---|---|---|
//! | [`StandardNotifier`] | new [`NotificationRecord`](crate::record::NotificationRecord) | none |
//! | [`CachedNotifier`] | shared record from a [`RecordCache`](crate::record::RecordCache) | one record per distinct name, process-wide |
//! | [`StackedNotifier`] | the owner's [`RecordStack`](crate::record::RecordStack) | one stack per entity or per thread |
//!
//! Dispatch is synchronous and runs on the caller's thread. Entities are
//! `!Send` and `!Sync`: observer lists are `Rc`-based.

pub mod cached;
pub mod observers;
pub mod stacked;
pub mod standard;
pub mod traits;

pub use cached::CachedNotifier;
pub use observers::{Callback, ObserverSnapshot, Observers, SubscriptionId};
pub use stacked::StackedNotifier;
pub use standard::StandardNotifier;
pub use traits::{Bindable, Notifier};
