//! # `bindable` - Property-Change Notification Strategies
//!
//! A micro-benchmark harness for the cost of the payload that accompanies a
//! "property changed" notification. Every entity shares one contract,
//! [`Bindable::set_property`], which stores a changed value and then notifies
//! observers synchronously with `(sender, record)`. What differs is where the
//! record comes from.
//!
//! ## Strategies
//!
//! 1. **Standard** ([`StandardNotifier`]): a new [`NotificationRecord`] per
//!    notification. One allocation per event.
//! 2. **Cached** ([`CachedNotifier`]): one immutable record per distinct name,
//!    shared process-wide through a concurrent [`RecordCache`]. Allocation is
//!    proportional to the number of names; the cache never shrinks.
//! 3. **Stacked** ([`StackedNotifier`]): one mutable [`RecordStack`] per
//!    entity or per thread. The reported name is the top of a stack, pushed
//!    and popped around each dispatch, so reentrant notifications never
//!    corrupt the name seen by an outer, still-running observer.
//!
//! ## Guarantees
//!
//! - Setting a property to its current value is a no-op: no record, no
//!   callback, `false` returned.
//! - No strategy touches a record when nobody is subscribed.
//! - A panicking observer propagates to the setter's caller; the stacked
//!   strategy still pops its frame on the way out.
//! - Pop without push and reading an idle stacked record are invariant
//!   violations and panic.
//!
//! ## Example
//!
//! ```rust
//! use bindable::{Bindable, ChangeRecord, StackedTestModel, TestModel};
//!
//! let model = StackedTestModel::default();
//! model.subscribe(|sender: &StackedTestModel, record: &dyn ChangeRecord| {
//!     match record.property_name() {
//!         "X" => {
//!             sender.set_y(sender.x() + 1);
//!             // The nested `Y` dispatch has unwound: the record reads `X` again.
//!             assert_eq!(record.property_name(), "X");
//!         }
//!         "Y" => assert_eq!(sender.y(), sender.x() + 1),
//!         _ => {}
//!     }
//! });
//!
//! assert!(model.set_x(1));
//! assert_eq!(model.y(), 2);
//! assert!(!model.set_x(1));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod driver;
pub mod model;
pub mod notify;
pub mod record;

pub use model::{
    chain_step, CachedTestModel, StackedTestModel, StandardTestModel, TestModel, ThreadStackedTestModel,
    PROPERTY_X, PROPERTY_Y, PROPERTY_Z,
};
pub use notify::{Bindable, CachedNotifier, Notifier, Observers, StackedNotifier, StandardNotifier, SubscriptionId};
pub use record::{ChangeRecord, NotificationRecord, RecordCache, RecordStack, StackFrame, StackOwnership};

// Compile-time checks on the per-dispatch footprint.
const _: () = {
    use core::mem;

    // A subscription id is a bare counter.
    assert!(mem::size_of::<SubscriptionId>() == mem::size_of::<u64>());

    // The standard record is a single boxed `str` (pointer + length).
    assert!(mem::size_of::<NotificationRecord>() == mem::size_of::<usize>() * 2);

    // A stack frame is just a reference back to its stack.
    assert!(mem::size_of::<StackFrame<'static>>() == mem::size_of::<usize>());

    // Loose upper bound: an empty observer list stays a few words.
    assert!(mem::size_of::<Observers<()>>() <= mem::size_of::<usize>() * 5);
};
