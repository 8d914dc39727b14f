//! # Subscription records and handles.
//!
//! Every `subscribe`/`one` call creates an [`Entry`] in the owning list and hands back a
//! [`Subscription`] that can later remove exactly that entry.
//!
//! ## Rules
//! - Entries are shared (`Arc`) between the live list and dispatch snapshots, so the
//!   executed flag set during a pass is visible to every copy.
//! - A once-entry is invoked at most once: [`Entry::begin`] flips the executed flag and
//!   refuses to start a once-entry twice.
//! - A [`Subscription`] only holds a weak reference to its list; it never keeps a
//!   dispatcher alive and unsubscribing after the dispatcher is gone is a no-op.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

/// Identifier of one subscription within its list.
///
/// Ids are assigned in subscription order and never reused by the same list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value (for logs/metrics).
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type-erased removal of a subscription by id.
///
/// Implemented by the subscription list so handles and tokens do not carry the
/// handler type.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> bool;
    fn holds(&self, id: SubscriptionId) -> bool;
}

/// One registered handler plus its per-subscription state.
pub(crate) struct Entry<H> {
    id: SubscriptionId,
    handler: H,
    once: bool,
    executed: AtomicBool,
}

impl<H> Entry<H> {
    pub(crate) fn new(id: SubscriptionId, handler: H, once: bool) -> Self {
        Self {
            id,
            handler,
            once,
            executed: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    pub(crate) fn handler(&self) -> &H {
        &self.handler
    }

    pub(crate) fn is_once(&self) -> bool {
        self.once
    }

    #[cfg(test)]
    pub(crate) fn is_executed(&self) -> bool {
        self.executed.load(Ordering::Acquire)
    }

    /// Marks the entry as executed.
    ///
    /// Returns `false` when this is a once-entry that already ran, in which case the
    /// caller must skip it.
    pub(crate) fn begin(&self) -> bool {
        let already = self.executed.swap(true, Ordering::AcqRel);
        !(self.once && already)
    }
}

/// Handle returned by `subscribe`/`one`.
///
/// Calling [`unsubscribe`](Subscription::unsubscribe) removes exactly the subscription this
/// handle was created for, even when the same handler was subscribed several times.
/// Dropping the handle does **not** unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    id: SubscriptionId,
    list: Weak<dyn Detach>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, list: Weak<dyn Detach>) -> Self {
        Self { id, list }
    }

    /// Id of the subscription this handle targets.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the subscription.
    ///
    /// Returns `true` if it was still registered. Safe to call any number of times.
    pub fn unsubscribe(&self) -> bool {
        self.list
            .upgrade()
            .map(|list| list.detach(self.id))
            .unwrap_or(false)
    }

    /// Returns `true` while the subscription is still registered.
    pub fn is_active(&self) -> bool {
        self.list
            .upgrade()
            .map(|list| list.holds(self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_entry_begins_once() {
        let entry = Entry::new(SubscriptionId::from_raw(1), (), true);
        assert!(!entry.is_executed());
        assert!(entry.begin());
        assert!(entry.is_executed());
        assert!(!entry.begin());
    }

    #[test]
    fn test_regular_entry_begins_every_time() {
        let entry = Entry::new(SubscriptionId::from_raw(2), (), false);
        assert!(entry.begin());
        assert!(entry.begin());
        assert!(entry.is_executed());
    }

    #[test]
    fn test_orphaned_handle_is_inert() {
        let handle = Subscription::new(SubscriptionId::from_raw(5), Weak::<Nothing>::new());
        assert!(!handle.is_active());
        assert!(!handle.unsubscribe());
        assert_eq!(handle.id().to_string(), "#5");
    }

    struct Nothing;

    impl Detach for Nothing {
        fn detach(&self, _id: SubscriptionId) -> bool {
            true
        }

        fn holds(&self, _id: SubscriptionId) -> bool {
            true
        }
    }
}
