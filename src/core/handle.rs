//! # Read-only facade.
//!
//! [`EventHandle`] is what a publisher hands to the outside world: it can subscribe,
//! unsubscribe and inspect, but it has **no dispatch operation**. It is built once per
//! dispatcher (on the first [`as_event`](crate::Dispatcher::as_event) call), cached, and the
//! same object is returned on every later call.
//!
//! ## Example
//! ```rust
//! use typed_events::{EventContext, EventDispatcher, EventHandle, Handler, Simple};
//!
//! struct Thermometer {
//!     changed: EventDispatcher<Simple<f32>>,
//! }
//!
//! impl Thermometer {
//!     fn on_change(&self) -> &EventHandle<Handler<Simple<f32>>> {
//!         self.changed.as_event()
//!     }
//! }
//!
//! let t = Thermometer { changed: EventDispatcher::new() };
//! t.on_change().subscribe(Handler::simple(|c: &f32, _ev: &EventContext| println!("{c}°C")));
//! assert_eq!(t.changed.count(), 1);
//! ```
//!
//! A facade cannot publish:
//! ```compile_fail
//! use typed_events::{EventDispatcher, Signal};
//!
//! let dispatcher = EventDispatcher::<Signal>::new();
//! let facade = dispatcher.as_event().clone();
//! facade.dispatch(());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::list::Subscriptions;
use crate::events::Simple;
use crate::subscribers::{Handler, Listener, Subscription};

/// Subscribe-only view over a dispatcher's subscription list.
pub struct EventHandle<H: Listener> {
    list: Arc<Subscriptions<H>>,
}

impl<H: Listener> EventHandle<H> {
    pub(crate) fn new(list: Arc<Subscriptions<H>>) -> Self {
        Self { list }
    }

    /// Subscribes `handler`; see [`Dispatcher::subscribe`](crate::Dispatcher::subscribe).
    pub fn subscribe(&self, handler: H) -> Subscription {
        self.list.add(handler, false)
    }

    /// Subscribes `handler` for a single invocation.
    pub fn one(&self, handler: H) -> Subscription {
        self.list.add(handler, true)
    }

    /// Removes the first subscription of `handler`; no-op if absent.
    pub fn unsubscribe(&self, handler: &H) -> bool {
        self.list.remove(handler)
    }

    /// Returns `true` if `handler` is subscribed.
    pub fn has(&self, handler: &H) -> bool {
        self.list.contains(handler)
    }

    /// Removes every subscription.
    pub fn clear(&self) {
        self.list.clear();
    }

    /// Number of subscriptions.
    pub fn count(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Event fired with the new count whenever the subscription list changes.
    pub fn subscription_changes(&self) -> EventHandle<Handler<Simple<usize>>> {
        self.list.changes()
    }

    /// Returns `true` if both facades observe the same dispatcher.
    pub fn same_source(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.list, &other.list)
    }
}

impl<H: Listener> Clone for EventHandle<H> {
    fn clone(&self) -> Self {
        Self {
            list: Arc::clone(&self.list),
        }
    }
}

impl<H: Listener> fmt::Debug for EventHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandle")
            .field("event", &self.list.label())
            .field("count", &self.list.len())
            .finish()
    }
}
