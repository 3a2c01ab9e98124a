//! The notification contract shared by every strategy.

use core::cell::Cell;
use std::rc::Rc;

use super::observers::{Observers, SubscriptionId};
use crate::record::ChangeRecord;

/// A dispatch strategy: owns an entity's observers and decides how the change
/// record handed to them is produced.
///
/// Implementations must deliver to observers if and only if at least one is
/// subscribed, synchronously, in subscription order, and must not construct
/// or fetch a record when nobody is listening.
pub trait Notifier<E> {
    /// The observers this notifier dispatches to.
    fn observers(&self) -> &Observers<E>;

    /// Notifies every observer that `name` changed on `sender`.
    fn raise_changed(&self, sender: &E, name: &'static str);
}

/// An entity whose properties raise change notifications.
///
/// Implementors store their fields in [`Cell`]s, embed a [`Notifier`], and
/// route every setter through [`set_property`](Self::set_property) with the
/// property's own name.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use bindable::{Bindable, ChangeRecord, StandardNotifier};
///
/// #[derive(Default)]
/// struct Point {
///     x: Cell<i32>,
///     notifier: StandardNotifier<Point>,
/// }
///
/// impl Bindable for Point {
///     type Notifier = StandardNotifier<Point>;
///
///     fn notifier(&self) -> &Self::Notifier {
///         &self.notifier
///     }
/// }
///
/// impl Point {
///     fn set_x(&self, value: i32) -> bool {
///         self.set_property(&self.x, value, "X")
///     }
/// }
///
/// let point = Point::default();
/// point.subscribe(|sender: &Point, record: &dyn ChangeRecord| {
///     assert_eq!(record.property_name(), "X");
///     assert_eq!(sender.x.get(), 7);
/// });
/// assert!(point.set_x(7));
/// assert!(!point.set_x(7));
/// ```
pub trait Bindable: Sized {
    /// The strategy used to build change records.
    type Notifier: Notifier<Self>;

    /// The embedded notifier.
    fn notifier(&self) -> &Self::Notifier;

    /// Notifies observers that `name` changed.
    #[inline]
    fn raise_changed(&self, name: &'static str) {
        self.notifier().raise_changed(self, name);
    }

    /// Stores `value` into `field` and notifies `name` if it differs from the
    /// current value. Returns whether the value changed.
    ///
    /// The field is updated before any observer runs.
    #[inline]
    fn set_property<T>(&self, field: &Cell<T>, value: T, name: &'static str) -> bool
    where
        T: Copy + PartialEq,
    {
        if field.get() == value {
            return false;
        }
        field.set(value);
        self.raise_changed(name);
        true
    }

    /// Attaches `callback`, invoked as `(sender, record)` for every change.
    fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Self, &dyn ChangeRecord) + 'static,
    {
        self.notifier().observers().subscribe(Rc::new(callback))
    }

    /// Detaches a subscription. Returns `false` if `id` was not attached.
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier().observers().unsubscribe(id)
    }

    /// Number of attached observers.
    fn observer_count(&self) -> usize {
        self.notifier().observers().len()
    }
}
