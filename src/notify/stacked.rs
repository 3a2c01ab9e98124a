//! Stacked strategy: one reusable mutable record per owner, kept correct under
//! reentrancy by a stack of property names.

use core::fmt;

use super::observers::{ObserverSnapshot, Observers};
use super::traits::Notifier;
use crate::record::{RecordStack, StackOwnership};

enum StackSlot {
    Instance(RecordStack),
    Thread,
}

/// Dispatches through a [`RecordStack`]: push the name, deliver the stack
/// itself as the record, pop on every exit path.
///
/// Allocation-free once the stack has grown to the deepest nesting seen, and
/// no cache grows with the set of names. Observers must read the record only
/// while their callback runs; it reports whatever is on top of the stack.
pub struct StackedNotifier<E> {
    observers: Observers<E>,
    stack: StackSlot,
}

impl<E> StackedNotifier<E> {
    /// Creates a notifier that owns its stack ([`StackOwnership::PerInstance`]).
    pub fn new() -> Self {
        Self::with_ownership(StackOwnership::PerInstance)
    }

    /// Creates a notifier that dispatches through the executing thread's stack
    /// ([`StackOwnership::PerThread`]).
    pub fn per_thread() -> Self {
        Self::with_ownership(StackOwnership::PerThread)
    }

    /// Creates a notifier with the given stack ownership.
    pub fn with_ownership(ownership: StackOwnership) -> Self {
        let stack = match ownership {
            StackOwnership::PerInstance => StackSlot::Instance(RecordStack::new()),
            StackOwnership::PerThread => StackSlot::Thread,
        };
        Self {
            observers: Observers::new(),
            stack,
        }
    }

    /// Who owns the stack this notifier dispatches through.
    pub fn ownership(&self) -> StackOwnership {
        match self.stack {
            StackSlot::Instance(_) => StackOwnership::PerInstance,
            StackSlot::Thread => StackOwnership::PerThread,
        }
    }

    /// Current depth of the stack this notifier uses on the calling thread.
    pub fn depth(&self) -> usize {
        match &self.stack {
            StackSlot::Instance(stack) => stack.depth(),
            StackSlot::Thread => RecordStack::try_with_thread_stack(RecordStack::depth).unwrap_or(0),
        }
    }
}

impl<E> Default for StackedNotifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn dispatch<E>(stack: &RecordStack, observers: &ObserverSnapshot<E>, sender: &E, name: &'static str) {
    let frame = stack.enter(name);
    observers.deliver(sender, frame.record());
}

impl<E> Notifier<E> for StackedNotifier<E> {
    #[inline]
    fn observers(&self) -> &Observers<E> {
        &self.observers
    }

    #[inline]
    fn raise_changed(&self, sender: &E, name: &'static str) {
        let Some(observers) = self.observers.snapshot() else {
            return;
        };
        match &self.stack {
            StackSlot::Instance(stack) => dispatch(stack, &observers, sender, name),
            StackSlot::Thread => {
                RecordStack::with_thread_stack(|stack| dispatch(stack, &observers, sender, name));
            }
        }
    }
}

impl<E> fmt::Debug for StackedNotifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackedNotifier")
            .field("observers", &self.observers)
            .field("ownership", &self.ownership())
            .field("depth", &self.depth())
            .finish()
    }
}
