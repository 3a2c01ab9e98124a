//! A single reusable change record whose property name is the top of a LIFO
//! stack.
//!
//! A dispatch pushes its name, hands the stack itself to observers as the
//! record, and pops when done. Nested (reentrant) dispatches push on top of
//! the in-flight one, so each callback reads the name that triggered it and
//! the outer name reappears once the inner dispatch unwinds.
//!
//! States are the stack depth `0..=N`; the owner starts (and idles) at 0.
//! Popping at depth 0 panics.

use core::cell::RefCell;

use super::ChangeRecord;

/// Who owns the [`RecordStack`] a stacked notifier dispatches through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StackOwnership {
    /// One stack per entity. Cheapest; reentrancy is tracked per entity.
    #[default]
    PerInstance,
    /// One stack per thread, shared by every entity on that thread. Tracks
    /// reentrancy across different entities on the same call chain.
    PerThread,
}

/// A change record backed by a stack of property names.
#[derive(Debug)]
pub struct RecordStack {
    names: RefCell<Vec<&'static str>>,
}

thread_local! {
    static THREAD_STACK: RecordStack = const { RecordStack::new() };
}

impl RecordStack {
    /// Creates an idle stack.
    pub const fn new() -> Self {
        Self {
            names: RefCell::new(Vec::new()),
        }
    }

    /// Creates an idle stack with room for `capacity` nested dispatches
    /// before it reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: RefCell::new(Vec::with_capacity(capacity)),
        }
    }

    /// Runs `f` with the calling thread's stack.
    ///
    /// # Panics
    /// Panics if the thread's stack was already destroyed, which can only
    /// happen when called from another thread-local's destructor while the
    /// thread exits. Use [`try_with_thread_stack`](Self::try_with_thread_stack)
    /// there.
    pub fn with_thread_stack<R>(f: impl FnOnce(&RecordStack) -> R) -> R {
        match THREAD_STACK.try_with(f) {
            Ok(result) => result,
            Err(_) => panic!("thread record stack used after it was destroyed during thread exit"),
        }
    }

    /// Runs `f` with the calling thread's stack, or returns `None` if the
    /// stack was already destroyed during thread exit.
    pub fn try_with_thread_stack<R>(f: impl FnOnce(&RecordStack) -> R) -> Option<R> {
        THREAD_STACK.try_with(f).ok()
    }

    /// Pushes `name`; it becomes the reported property name.
    #[inline]
    pub fn push(&self, name: &'static str) {
        self.names.borrow_mut().push(name);
    }

    /// Pops the current name and returns it.
    ///
    /// # Panics
    /// Panics if the stack is idle (no matching [`push`](Self::push)).
    #[inline]
    pub fn pop(&self) -> &'static str {
        let popped = self.names.borrow_mut().pop();
        match popped {
            Some(name) => name,
            None => panic!("RecordStack::pop without a matching push"),
        }
    }

    /// Pushes `name` and returns a guard that pops it when dropped, including
    /// while unwinding from a panicking observer.
    #[inline]
    #[must_use = "the name is popped as soon as the frame is dropped"]
    pub fn enter(&self, name: &'static str) -> StackFrame<'_> {
        self.push(name);
        StackFrame { stack: self }
    }

    /// The name on top of the stack, if any.
    #[inline]
    pub fn top(&self) -> Option<&'static str> {
        self.names.borrow().last().copied()
    }

    /// Number of dispatches currently in flight through this stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.names.borrow().len()
    }

    /// Returns `true` when no dispatch is in flight.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.names.borrow().is_empty()
    }
}

impl Default for RecordStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeRecord for RecordStack {
    /// # Panics
    /// Panics when read while idle, i.e. outside of a dispatch.
    #[inline]
    fn property_name(&self) -> &str {
        match self.top() {
            Some(name) => name,
            None => panic!("stacked change record read outside of a dispatch"),
        }
    }
}

/// One in-flight dispatch on a [`RecordStack`].
///
/// Dropping the frame pops its name.
#[derive(Debug)]
pub struct StackFrame<'a> {
    stack: &'a RecordStack,
}

impl<'a> StackFrame<'a> {
    /// The record to hand to observers for this dispatch.
    #[inline]
    pub fn record(&self) -> &'a dyn ChangeRecord {
        self.stack
    }
}

impl Drop for StackFrame<'_> {
    #[inline]
    fn drop(&mut self) {
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_push_pop_depth() {
        let stack = RecordStack::new();
        assert!(stack.is_idle());

        stack.push("X");
        stack.push("Y");
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.property_name(), "Y");

        assert_eq!(stack.pop(), "Y");
        assert_eq!(stack.property_name(), "X");
        assert_eq!(stack.pop(), "X");
        assert!(stack.is_idle());
        assert_eq!(stack.top(), None);
    }

    #[test]
    fn test_nested_frames_restore_outer_name() {
        let stack = RecordStack::with_capacity(4);
        let outer = stack.enter("X");
        assert_eq!(outer.record().property_name(), "X");
        {
            let inner = stack.enter("Y");
            assert_eq!(inner.record().property_name(), "Y");
            {
                let innermost = stack.enter("Z");
                assert_eq!(innermost.record().property_name(), "Z");
                assert_eq!(stack.depth(), 3);
            }
            assert_eq!(inner.record().property_name(), "Y");
        }
        assert_eq!(outer.record().property_name(), "X");
        drop(outer);
        assert!(stack.is_idle());
    }

    #[test]
    fn test_frame_pops_during_unwind() {
        let stack = RecordStack::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _frame = stack.enter("X");
            panic!("observer failed");
        }));
        assert!(result.is_err());
        assert!(stack.is_idle());
    }

    #[test]
    #[should_panic(expected = "without a matching push")]
    fn test_pop_on_idle_stack_panics() {
        RecordStack::new().pop();
    }

    #[test]
    #[should_panic(expected = "outside of a dispatch")]
    fn test_reading_idle_record_panics() {
        let stack = RecordStack::new();
        let _ = stack.property_name();
    }

    #[test]
    fn test_thread_stacks_are_disjoint() {
        RecordStack::with_thread_stack(|stack| {
            let _frame = stack.enter("Main");
            std::thread::spawn(|| {
                RecordStack::with_thread_stack(|other| assert!(other.is_idle()));
            })
            .join()
            .unwrap();
            assert_eq!(stack.property_name(), "Main");
        });
        RecordStack::with_thread_stack(|stack| assert!(stack.is_idle()));
    }

    #[test]
    fn test_try_with_thread_stack_on_live_thread() {
        let depth = RecordStack::try_with_thread_stack(|stack| {
            let _frame = stack.enter("X");
            stack.depth()
        });
        assert_eq!(depth, Some(1));
    }

    #[test]
    fn test_try_with_thread_stack_from_exiting_thread() {
        use std::sync::atomic::{AtomicBool, Ordering};

        static RETURNED: AtomicBool = AtomicBool::new(false);

        struct LateReader;

        impl Drop for LateReader {
            fn drop(&mut self) {
                // The stack may or may not be gone yet; either way this returns.
                let _ = RecordStack::try_with_thread_stack(RecordStack::depth);
                RETURNED.store(true, Ordering::SeqCst);
            }
        }

        thread_local! {
            static LATE_READER: LateReader = const { LateReader };
        }

        std::thread::spawn(|| {
            LATE_READER.with(|_| {});
            RecordStack::with_thread_stack(|stack| stack.push("X"));
            RecordStack::with_thread_stack(RecordStack::pop);
        })
        .join()
        .unwrap();
        assert!(RETURNED.load(Ordering::SeqCst));
    }
}
