//! # Live subscription list.
//!
//! [`Subscriptions`] is the single owner of a dispatcher's ordered entries. The dispatcher,
//! its facade, every [`Subscription`] handle and every [`EventContext`](crate::EventContext)
//! mutate the same list through it.
//!
//! ## Architecture
//! ```text
//! EventDispatcher ─┐
//! EventHandle    ──┼──► Subscriptions ──► Mutex<Vec<Arc<Entry>>>   (live, ordered)
//! Subscription   ──┘         │
//!   (weak)                   └──► snapshot() ──► Vec<Arc<Entry>>   (iterated by dispatch)
//! ```
//!
//! ## Rules
//! - Insertion order is invocation order.
//! - Dispatch iterates a [`snapshot`](Subscriptions::snapshot); only the live list is
//!   mutated, so handlers may subscribe/unsubscribe freely during a pass.
//! - The lock is held for list mutation or copying only, never while a handler runs or
//!   while change observers are notified.
//! - Value-based removal takes the **first** matching entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use crate::core::config::Config;
use crate::core::dispatcher::Dispatcher;
use crate::core::handle::EventHandle;
use crate::events::Simple;
use crate::subscribers::{Detach, Entry, Handler, Listener, Subscription, SubscriptionId};

/// Dispatcher used to publish subscription-count changes.
pub(crate) type ChangeDispatcher = Dispatcher<Handler<Simple<usize>>>;

/// Ordered, shared list of subscriptions.
pub(crate) struct Subscriptions<H: Listener> {
    entries: Mutex<Vec<Arc<Entry<H>>>>,
    next_id: AtomicU64,
    config: Config,
    changes: OnceLock<ChangeDispatcher>,
}

impl<H: Listener> Subscriptions<H> {
    pub(crate) fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::with_capacity(config.capacity)),
            next_id: AtomicU64::new(1),
            config,
            changes: OnceLock::new(),
        })
    }

    pub(crate) fn label(&self) -> &str {
        self.config.label_or_default()
    }

    /// Appends a subscription and returns its handle.
    pub(crate) fn add(self: &Arc<Self>, handler: H, once: bool) -> Subscription {
        let id = SubscriptionId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let count = {
            let mut entries = self.entries.lock();
            entries.push(Arc::new(Entry::new(id, handler, once)));
            entries.len()
        };
        tracing::trace!(event = self.label(), subscription = %id, once, count, "subscribed");
        self.notify(count);
        self.handle(id)
    }

    /// Removes the first entry whose handler is `handler`.
    pub(crate) fn remove(&self, handler: &H) -> bool {
        let removed = {
            let mut entries = self.entries.lock();
            entries
                .iter()
                .position(|e| e.handler().same_listener(handler))
                .map(|pos| (entries.remove(pos).id(), entries.len()))
        };
        match removed {
            Some((id, count)) => {
                tracing::trace!(event = self.label(), subscription = %id, count, "unsubscribed");
                self.notify(count);
                true
            }
            None => false,
        }
    }

    /// Removes the entry with the given id.
    pub(crate) fn remove_id(&self, id: SubscriptionId) -> bool {
        let count = {
            let mut entries = self.entries.lock();
            match entries.iter().position(|e| e.id() == id) {
                Some(pos) => {
                    entries.remove(pos);
                    Some(entries.len())
                }
                None => None,
            }
        };
        match count {
            Some(count) => {
                tracing::trace!(event = self.label(), subscription = %id, count, "unsubscribed");
                self.notify(count);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, handler: &H) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| e.handler().same_listener(handler))
    }

    pub(crate) fn contains_id(&self, id: SubscriptionId) -> bool {
        self.entries.lock().iter().any(|e| e.id() == id)
    }

    /// Removes every entry. Idempotent; observers hear about it only when something was removed.
    pub(crate) fn clear(&self) {
        let removed = {
            let mut entries = self.entries.lock();
            let removed = entries.len();
            entries.clear();
            removed
        };
        if removed > 0 {
            tracing::debug!(event = self.label(), removed, "cleared");
            self.notify(0);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Copy of the live list for one dispatch pass.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Entry<H>>> {
        self.entries.lock().clone()
    }

    /// Handle targeting exactly the subscription `id`.
    pub(crate) fn handle(self: &Arc<Self>, id: SubscriptionId) -> Subscription {
        let list: Weak<dyn Detach> = Arc::downgrade(self) as Weak<dyn Detach>;
        Subscription::new(id, list)
    }

    /// Facade over the change dispatcher, created on first use.
    pub(crate) fn changes(&self) -> EventHandle<Handler<Simple<usize>>> {
        self.changes
            .get_or_init(|| {
                let label = format!("{}.subscription_changes", self.label());
                Dispatcher::with_config(Config::labeled(label))
            })
            .as_event()
            .clone()
    }

    fn notify(&self, count: usize) {
        let Some(changes) = self.changes.get() else {
            return;
        };
        if let Err(err) = changes.dispatch(count) {
            tracing::warn!(
                event = self.label(),
                count,
                error = %err,
                "subscription change observer failed"
            );
        }
    }
}

impl<H: Listener> Detach for Subscriptions<H> {
    fn detach(&self, id: SubscriptionId) -> bool {
        self.remove_id(id)
    }

    fn holds(&self, id: SubscriptionId) -> bool {
        self.contains_id(id)
    }
}
