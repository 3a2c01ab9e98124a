//! Notification payloads delivered to observers.
//!
//! Every payload implements [`ChangeRecord`]. Observers only ever see
//! `&dyn ChangeRecord`, borrowed for the duration of one callback, so the
//! three strategies can hand out very different objects behind the same
//! contract:
//!
//! - [`NotificationRecord`]: an immutable name, built per event or shared
//!   through a [`RecordCache`].
//! - [`RecordStack`]: one mutable record per owner whose name is the top of
//!   a LIFO stack.

pub mod cache;
pub mod stack;

pub use cache::RecordCache;
pub use stack::{RecordStack, StackFrame, StackOwnership};

use core::fmt;

/// The payload of a property-changed notification.
pub trait ChangeRecord {
    /// Name of the property whose value changed.
    ///
    /// Only meaningful while the observer callback that received the record
    /// is running.
    fn property_name(&self) -> &str;
}

/// An immutable change record carrying an owned property name.
///
/// Constructing one performs exactly one heap allocation (the name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationRecord {
    property_name: Box<str>,
}

impl NotificationRecord {
    /// Creates a record for `property_name`.
    pub fn new(property_name: &str) -> Self {
        Self {
            property_name: property_name.into(),
        }
    }

    /// Returns the property name.
    #[inline]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }
}

impl ChangeRecord for NotificationRecord {
    #[inline]
    fn property_name(&self) -> &str {
        &self.property_name
    }
}

impl fmt::Display for NotificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyChanged({})", self.property_name)
    }
}

impl fmt::Debug for dyn ChangeRecord + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeRecord")
            .field("property_name", &self.property_name())
            .finish()
    }
}
