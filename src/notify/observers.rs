//! Observer registration and fan-out.
//!
//! Subscribers live in an immutable `Rc<[Subscriber<E>]>` that is replaced
//! wholesale on subscribe/unsubscribe. A dispatch clones the `Rc` (a counter
//! bump, no allocation) and iterates it without holding any borrow, so
//! callbacks may freely subscribe, unsubscribe, or trigger nested dispatches.
//! Membership changes made during a dispatch take effect from the next one.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

use crate::record::ChangeRecord;

/// An observer callback: `(sender, record)`.
pub type Callback<E> = dyn Fn(&E, &dyn ChangeRecord);

/// Identity of one subscription, used to detach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// The raw id. Ids are unique per [`Observers`] list and increase with
    /// subscription order.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

struct Subscriber<E> {
    id: SubscriptionId,
    callback: Rc<Callback<E>>,
}

// Manual Clone: `E` itself need not be Clone.
impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Rc::clone(&self.callback),
        }
    }
}

/// The subscriber list of one entity, in subscription order.
pub struct Observers<E> {
    /// `None` while nobody is subscribed.
    subscribers: RefCell<Option<Rc<[Subscriber<E>]>>>,
    next_id: Cell<u64>,
}

impl<E> Observers<E> {
    /// Creates an empty list. Does not allocate.
    pub const fn new() -> Self {
        Self {
            subscribers: RefCell::new(None),
            next_id: Cell::new(0),
        }
    }

    /// Appends `callback` and returns its identity.
    pub fn subscribe(&self, callback: Rc<Callback<E>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let mut slot = self.subscribers.borrow_mut();
        let mut list: Vec<Subscriber<E>> = slot.as_deref().map(<[_]>::to_vec).unwrap_or_default();
        list.push(Subscriber { id, callback });
        *slot = Some(Rc::from(list));
        id
    }

    /// Detaches the subscription `id`. Returns `false` if it was not attached.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slot = self.subscribers.borrow_mut();
        let Some(current) = slot.as_deref() else {
            return false;
        };
        if !current.iter().any(|s| s.id == id) {
            return false;
        }

        let list: Vec<Subscriber<E>> = current.iter().filter(|s| s.id != id).cloned().collect();
        *slot = if list.is_empty() { None } else { Some(Rc::from(list)) };
        true
    }

    /// Number of attached observers.
    pub fn len(&self) -> usize {
        self.subscribers.borrow().as_deref().map_or(0, <[_]>::len)
    }

    /// Returns `true` if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_none()
    }

    /// Captures the current subscribers for one dispatch, or `None` if there
    /// are none (in which case no record should be produced at all).
    #[inline]
    pub fn snapshot(&self) -> Option<ObserverSnapshot<E>> {
        self.subscribers.borrow().clone().map(ObserverSnapshot)
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

/// The observers captured at the start of a dispatch.
pub struct ObserverSnapshot<E>(Rc<[Subscriber<E>]>);

impl<E> ObserverSnapshot<E> {
    /// Invokes every captured observer with `(sender, record)`, in
    /// subscription order, on the calling thread.
    ///
    /// A panicking observer stops delivery and propagates to the caller.
    #[inline]
    pub fn deliver(&self, sender: &E, record: &dyn ChangeRecord) {
        for subscriber in self.0.iter() {
            (subscriber.callback)(sender, record);
        }
    }

    /// Number of observers that will be invoked.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: empty lists never produce a snapshot.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
