//! # Dispatcher: the publisher side of an event.
//!
//! [`Dispatcher`] owns a subscription list and is the only type that can publish. It is
//! generic over the stored handler type:
//!
//! - [`EventDispatcher<F>`] = `Dispatcher<Handler<F>>`: synchronous handlers
//!   (`dispatch`, `dispatch_deferred`, see `runner.rs`);
//! - [`AsyncEventDispatcher<F>`] = `Dispatcher<AsyncHandler<F>>`: asynchronous handlers
//!   (`dispatch(..).await`, `dispatch_deferred`, see `pipeline.rs`).
//!
//! Subscription management (this file) is shared by both.
//!
//! ## Cloning
//! Clones share the list **and** the cached facade; [`same_dispatcher`](Dispatcher::same_dispatcher)
//! tells whether two values are the same dispatcher.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::core::config::Config;
use crate::core::handle::EventHandle;
use crate::core::list::Subscriptions;
use crate::events::{Signal, Simple, WithSender};
use crate::subscribers::{AsyncHandler, Handler, Listener, Subscription};

/// Dispatcher for synchronous handlers of flavor `F`.
pub type EventDispatcher<F> = Dispatcher<Handler<F>>;

/// Dispatcher for asynchronous handlers of flavor `F`.
pub type AsyncEventDispatcher<F> = Dispatcher<AsyncHandler<F>>;

/// Synchronous dispatcher without payload.
pub type SignalDispatcher = EventDispatcher<Signal>;

/// Synchronous dispatcher with one payload value.
pub type SimpleEventDispatcher<T> = EventDispatcher<Simple<T>>;

/// Synchronous dispatcher with a sender and one payload value.
pub type SenderEventDispatcher<S, T> = EventDispatcher<WithSender<S, T>>;

/// Outcome of a synchronous or sequential-async dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Every handler of the snapshot was offered the event.
    Completed,
    /// A handler called [`stop_propagation`](crate::EventContext::stop_propagation).
    Stopped,
}

impl Propagation {
    /// Returns `true` if a handler stopped the pass.
    pub fn is_stopped(self) -> bool {
        matches!(self, Propagation::Stopped)
    }
}

/// Publisher owning an ordered subscription list.
pub struct Dispatcher<H: Listener> {
    inner: Arc<Inner<H>>,
}

struct Inner<H: Listener> {
    list: Arc<Subscriptions<H>>,
    facade: OnceLock<EventHandle<H>>,
}

impl<H: Listener> Dispatcher<H> {
    /// Creates an anonymous dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a dispatcher with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                list: Subscriptions::new(config),
                facade: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn list(&self) -> &Arc<Subscriptions<H>> {
        &self.inner.list
    }

    /// Appends `handler` to the end of the list.
    ///
    /// The returned [`Subscription`] removes exactly this subscription, which is the
    /// reliable way to undo one of several subscriptions of the same handler.
    pub fn subscribe(&self, handler: H) -> Subscription {
        self.inner.list.add(handler, false)
    }

    /// Appends `handler` for a single invocation.
    ///
    /// The subscription removes itself right after its first invocation, before the next
    /// handler of the same pass runs.
    pub fn one(&self, handler: H) -> Subscription {
        self.inner.list.add(handler, true)
    }

    /// Removes the first subscription of `handler`.
    ///
    /// Returns `false` (and does nothing) if `handler` is not subscribed.
    pub fn unsubscribe(&self, handler: &H) -> bool {
        self.inner.list.remove(handler)
    }

    /// Returns `true` if `handler` is subscribed.
    pub fn has(&self, handler: &H) -> bool {
        self.inner.list.contains(handler)
    }

    /// Removes every subscription. Idempotent.
    pub fn clear(&self) {
        self.inner.list.clear();
    }

    /// Number of subscriptions.
    pub fn count(&self) -> usize {
        self.inner.list.len()
    }

    /// Returns `true` if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Label this dispatcher was configured with (`"anonymous"` if none).
    pub fn label(&self) -> &str {
        self.inner.list.label()
    }

    /// Read-only facade over this dispatcher.
    ///
    /// Built on first call and cached: every call (on any clone) returns the same object.
    pub fn as_event(&self) -> &EventHandle<H> {
        self.inner
            .facade
            .get_or_init(|| EventHandle::new(Arc::clone(&self.inner.list)))
    }

    /// Event fired with the new count whenever the subscription list changes.
    pub fn subscription_changes(&self) -> EventHandle<Handler<Simple<usize>>> {
        self.inner.list.changes()
    }

    /// Returns `true` if both values are the same dispatcher.
    pub fn same_dispatcher(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<H: Listener> Default for Dispatcher<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Listener> Clone for Dispatcher<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: Listener> fmt::Debug for Dispatcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("event", &self.label())
            .field("count", &self.count())
            .finish()
    }
}
