//! # Per-invocation interaction token.
//!
//! Every handler invocation receives a fresh [`EventContext`]. It lets the handler:
//! - remove **its own** subscription ([`EventContext::unsubscribe`]);
//! - halt the rest of a synchronous or sequential-async pass
//!   ([`EventContext::stop_propagation`]).
//!
//! The stop flag is a [`CancellationToken`] scoped to one invocation: it only ever moves
//! from "running" to "stopped". Deferred dispatch hands out tokens too, but since every
//! deferred handler runs on its own task there is no remaining loop to halt and stopping
//! has no observable effect.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::subscribers::{Subscription, SubscriptionId};

/// Interaction token passed to each invoked handler.
///
/// Cheap to clone; clones share the same stop flag, so an async handler may move a clone
/// into spawned work and still stop propagation of its own pass.
#[derive(Clone)]
pub struct EventContext {
    subscription: Subscription,
    stop: CancellationToken,
}

impl EventContext {
    pub(crate) fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            stop: CancellationToken::new(),
        }
    }

    /// Removes the subscription currently being invoked.
    ///
    /// Idempotent: a second call finds nothing to remove.
    pub fn unsubscribe(&self) {
        self.subscription.unsubscribe();
    }

    /// Stops the current dispatch pass after this handler returns.
    pub fn stop_propagation(&self) {
        self.stop.cancel();
    }

    /// Returns `true` once [`stop_propagation`](Self::stop_propagation) was called.
    pub fn is_propagation_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Id of the subscription being invoked.
    pub fn subscription_id(&self) -> SubscriptionId {
        self.subscription.id()
    }
}

impl fmt::Debug for EventContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventContext")
            .field("subscription", &self.subscription.id())
            .field("propagation_stopped", &self.is_propagation_stopped())
            .finish()
    }
}
