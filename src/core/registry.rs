//! # Named event registry.
//!
//! [`EventRegistry`] maps event names to dispatchers, creating each dispatcher on first use
//! and returning the **same** dispatcher for the same name afterwards. On top of the map it
//! offers a named-event surface (`subscribe(name, ..)`, `dispatch(name, ..)`, ...).
//!
//! ## Architecture
//! ```text
//! registry.subscribe("saved", h) ─► get("saved") ─► Dispatcher ─► subscribe(h)
//! registry.dispatch("saved", a)  ─► lookup("saved") ─┬─► Some(d) ─► d.dispatch(a)
//!                                                    └─► None    ─► Completed
//! ```
//!
//! ## Rules
//! - `get`, `subscribe` and `one` create the dispatcher if needed; the dispatcher is labeled
//!   with its name.
//! - `unsubscribe`, `has` and `dispatch` never create one: an unknown name is a no-op.
//! - The map lock is never held while handlers run.
//! - `remove` only forgets the name: holders of the dispatcher keep using it, and a later
//!   `get` builds a fresh one.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;

use crate::core::config::Config;
use crate::core::dispatcher::{Dispatcher, Propagation};
use crate::error::DispatchError;
use crate::events::Flavor;
use crate::subscribers::{AsyncHandler, Handler, Listener, Subscription};

/// Registry of sync-handler dispatchers of flavor `F`.
pub type EventDispatcherRegistry<F> = EventRegistry<Handler<F>>;

/// Registry of async-handler dispatchers of flavor `F`.
pub type AsyncEventDispatcherRegistry<F> = EventRegistry<AsyncHandler<F>>;

/// String-keyed memo map of dispatchers.
pub struct EventRegistry<H: Listener> {
    events: Mutex<HashMap<String, Dispatcher<H>>>,
}

impl<H: Listener> EventRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the dispatcher for `name`, creating it on first use.
    pub fn get(&self, name: &str) -> Dispatcher<H> {
        let mut events = self.events.lock();
        if let Some(existing) = events.get(name) {
            return existing.clone();
        }

        let created = Dispatcher::with_config(Config::labeled(name.to_owned()));
        events.insert(name.to_owned(), created.clone());
        tracing::debug!(event = name, "named event created");
        created
    }

    /// Forgets `name` and returns its dispatcher, if any.
    pub fn remove(&self, name: &str) -> Option<Dispatcher<H>> {
        let removed = self.events.lock().remove(name);
        if removed.is_some() {
            tracing::debug!(event = name, "named event removed");
        }
        removed
    }

    /// Returns `true` if a dispatcher exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.events.lock().contains_key(name)
    }

    /// Returns the sorted list of known event names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.lock().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of known event names.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns `true` if no event has been created yet.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Subscribes `handler` to the event `name`.
    pub fn subscribe(&self, name: &str, handler: H) -> Subscription {
        self.get(name).subscribe(handler)
    }

    /// Subscribes `handler` to the event `name` for a single invocation.
    pub fn one(&self, name: &str, handler: H) -> Subscription {
        self.get(name).one(handler)
    }

    /// Removes the first subscription of `handler` from the event `name`.
    pub fn unsubscribe(&self, name: &str, handler: &H) -> bool {
        self.lookup(name)
            .is_some_and(|dispatcher| dispatcher.unsubscribe(handler))
    }

    /// Returns `true` if `handler` is subscribed to the event `name`.
    pub fn has(&self, name: &str, handler: &H) -> bool {
        self.lookup(name)
            .is_some_and(|dispatcher| dispatcher.has(handler))
    }

    fn lookup(&self, name: &str) -> Option<Dispatcher<H>> {
        self.events.lock().get(name).cloned()
    }
}

impl<F: Flavor> EventRegistry<Handler<F>> {
    /// Dispatches the event `name`; an unknown name has no handlers.
    pub fn dispatch(&self, name: &str, args: F::Args) -> Result<Propagation, DispatchError> {
        match self.lookup(name) {
            Some(dispatcher) => dispatcher.dispatch(args),
            None => Ok(Propagation::Completed),
        }
    }
}

impl<F: Flavor> EventRegistry<AsyncHandler<F>> {
    /// Dispatches the event `name` through the sequential async pipeline.
    pub async fn dispatch(&self, name: &str, args: F::Args) -> Result<Propagation, DispatchError> {
        match self.lookup(name) {
            Some(dispatcher) => dispatcher.dispatch(args).await,
            None => Ok(Propagation::Completed),
        }
    }
}

impl<H: Listener> Default for EventRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Listener> fmt::Debug for EventRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("events", &self.names())
            .finish()
    }
}
