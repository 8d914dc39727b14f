//! # Dispatch pass for synchronous handlers.
//!
//! Implements [`EventDispatcher::dispatch`] and [`EventDispatcher::dispatch_deferred`].
//!
//! ## Pass
//! ```text
//! snapshot = live list (copy)
//! for entry in snapshot {
//!   ├─► ctx = EventContext(entry)               fresh token per invocation
//!   ├─► once && executed ─► skip
//!   ├─► mark executed
//!   ├─► handler(args, &ctx)                     Err ─► abort pass, return Err
//!   ├─► once ─► remove entry from live list     (before the stop check)
//!   └─► ctx stopped ─► return Stopped
//! }
//! return Completed
//! ```
//!
//! ## Rules
//! - Handlers run in subscription order.
//! - An entry removed from the live list mid-pass still runs in this pass (it is in the
//!   snapshot); entries added mid-pass first run on the next pass.
//! - Handler errors are returned, never logged or swallowed; panics unwind through
//!   `dispatch` (a once-entry is still removed on the way out).
//! - Deferred: each handler runs on its own tokio task; once-entries are removed when
//!   scheduled; stopping propagation has no effect.

use crate::core::deferred::Deferred;
use crate::core::dispatcher::{EventDispatcher, Propagation};
use crate::core::list::Subscriptions;
use crate::error::DispatchError;
use crate::events::{EventContext, Flavor};
use crate::subscribers::{Listener, SubscriptionId};

/// Removes a once-entry from the live list when dropped.
///
/// Dropped right after the handler returns, or while unwinding if it panicked.
pub(crate) struct OnceCleanup<'a, H: Listener> {
    list: &'a Subscriptions<H>,
    id: Option<SubscriptionId>,
}

impl<'a, H: Listener> OnceCleanup<'a, H> {
    pub(crate) fn arm(list: &'a Subscriptions<H>, id: SubscriptionId, once: bool) -> Self {
        Self {
            list,
            id: once.then_some(id),
        }
    }
}

impl<H: Listener> Drop for OnceCleanup<'_, H> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            if self.list.remove_id(id) {
                tracing::trace!(event = self.list.label(), subscription = %id, "once subscription consumed");
            }
        }
    }
}

impl<F: Flavor> EventDispatcher<F> {
    /// Invokes every subscribed handler synchronously, in subscription order.
    ///
    /// Returns [`Propagation::Stopped`] if a handler stopped propagation, or the first
    /// handler error (the remaining handlers of the pass are not invoked).
    pub fn dispatch(&self, args: F::Args) -> Result<Propagation, DispatchError> {
        let list = self.list();
        let snapshot = list.snapshot();
        tracing::trace!(event = list.label(), handlers = snapshot.len(), "dispatch");

        for entry in snapshot {
            let ctx = EventContext::new(list.handle(entry.id()));
            if !entry.begin() {
                continue;
            }

            let cleanup = OnceCleanup::arm(list, entry.id(), entry.is_once());
            let outcome = entry.handler().call(&args, &ctx);
            drop(cleanup);

            if let Err(source) = outcome {
                return Err(DispatchError::Handler {
                    subscription: entry.id(),
                    source,
                });
            }
            if ctx.is_propagation_stopped() {
                tracing::debug!(event = list.label(), subscription = %entry.id(), "propagation stopped");
                return Ok(Propagation::Stopped);
            }
        }

        Ok(Propagation::Completed)
    }

    /// Schedules every subscribed handler on its own tokio task.
    ///
    /// Must be called from within a tokio runtime; otherwise returns
    /// [`DispatchError::NoRuntime`] without scheduling anything.
    pub fn dispatch_deferred(&self, args: F::Args) -> Result<Deferred, DispatchError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;
        let list = self.list();
        let snapshot = list.snapshot();
        tracing::trace!(event = list.label(), handlers = snapshot.len(), "dispatch deferred");

        let mut deferred = Deferred::with_capacity(snapshot.len());
        for entry in snapshot {
            let ctx = EventContext::new(list.handle(entry.id()));
            if !entry.begin() {
                continue;
            }

            let id = entry.id();
            let handler = entry.handler().clone();
            let args = args.clone();
            let task = runtime.spawn(async move {
                handler
                    .call(&args, &ctx)
                    .map_err(|source| DispatchError::Handler {
                        subscription: id,
                        source,
                    })
            });
            if entry.is_once() && list.remove_id(id) {
                tracing::trace!(event = list.label(), subscription = %id, "once subscription consumed");
            }
            deferred.push(id, task);
        }

        Ok(deferred)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::core::dispatcher::{SenderEventDispatcher, SignalDispatcher, SimpleEventDispatcher};
    use crate::events::Signal;
    use crate::subscribers::Handler;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(log: &Log, name: &'static str) -> Handler<Signal> {
        let log = Arc::clone(log);
        Handler::signal(move |_ev: &EventContext| log.lock().push(name))
    }

    fn counter(hits: &Arc<AtomicUsize>) -> Handler<Signal> {
        let hits = Arc::clone(hits);
        Handler::signal(move |_ev: &EventContext| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_fifo_order() {
        let d = SignalDispatcher::new();
        let log = Log::default();
        d.subscribe(recorder(&log, "h1"));
        d.subscribe(recorder(&log, "h2"));
        d.subscribe(recorder(&log, "h3"));

        let outcome = d.dispatch(()).unwrap();
        assert_eq!(outcome, Propagation::Completed);
        assert_eq!(*log.lock(), vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn test_one_fires_once() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = counter(&hits);
        d.one(h.clone());

        d.dispatch(()).unwrap();
        assert!(!d.has(&h));
        d.dispatch(()).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(d.count(), 0);
    }

    #[test]
    fn test_one_removed_before_next_handler_runs() {
        let d = SignalDispatcher::new();
        let observed = Arc::new(AtomicUsize::new(usize::MAX));
        let once = Handler::signal(|_ev: &EventContext| {});
        d.one(once.clone());
        {
            let events = d.as_event().clone();
            let observed = Arc::clone(&observed);
            let once = once.clone();
            d.subscribe(Handler::signal(move |_ev: &EventContext| {
                observed.store(usize::from(events.has(&once)), Ordering::SeqCst);
            }));
        }

        d.dispatch(()).unwrap();
        assert_eq!(observed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribed_later_handler_still_runs_this_pass() {
        let d = SignalDispatcher::new();
        let log = Log::default();
        let h2 = recorder(&log, "h2");
        let h1 = {
            let events = d.as_event().clone();
            let log = Arc::clone(&log);
            let h2 = h2.clone();
            Handler::signal(move |_ev: &EventContext| {
                log.lock().push("h1");
                events.unsubscribe(&h2);
            })
        };
        d.subscribe(h1);
        d.subscribe(h2);

        d.dispatch(()).unwrap();
        assert_eq!(*log.lock(), vec!["h1", "h2"]);

        d.dispatch(()).unwrap();
        assert_eq!(*log.lock(), vec!["h1", "h2", "h1"]);
    }

    #[test]
    fn test_subscribed_during_pass_waits_for_next_pass() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let late = counter(&hits);
        {
            let events = d.as_event().clone();
            let late = late.clone();
            d.one(Handler::signal(move |_ev: &EventContext| {
                events.subscribe(late.clone());
            }));
        }

        d.dispatch(()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(d.has(&late));

        d.dispatch(()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_propagation_after_two_passes() {
        let d = SignalDispatcher::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        {
            let first = Arc::clone(&first);
            d.subscribe(Handler::signal(move |ev: &EventContext| {
                let n = first.fetch_add(1, Ordering::SeqCst) + 1;
                if n > 2 {
                    ev.stop_propagation();
                }
            }));
        }
        d.subscribe(counter(&second));

        let outcomes: Vec<_> = (0..4).map(|_| d.dispatch(()).unwrap()).collect();

        assert_eq!(first.load(Ordering::SeqCst), 4);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(
            outcomes,
            vec![
                Propagation::Completed,
                Propagation::Completed,
                Propagation::Stopped,
                Propagation::Stopped,
            ]
        );
    }

    #[test]
    fn test_once_cleanup_happens_before_stop() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let stopper = Handler::signal(|ev: &EventContext| ev.stop_propagation());
        d.one(stopper.clone());
        d.subscribe(counter(&hits));

        assert!(d.dispatch(()).unwrap().is_stopped());
        assert!(!d.has(&stopper));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        assert_eq!(d.dispatch(()).unwrap(), Propagation::Completed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_silences_dispatch() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        d.subscribe(counter(&hits));
        d.subscribe(counter(&hits));

        d.clear();
        assert_eq!(d.count(), 0);
        d.dispatch(()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_context_unsubscribes_itself_idempotently() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = Arc::clone(&hits);
            d.subscribe(Handler::signal(move |ev: &EventContext| {
                hits.fetch_add(1, Ordering::SeqCst);
                ev.unsubscribe();
                ev.unsubscribe();
            }));
        }
        d.subscribe(counter(&hits));

        d.dispatch(()).unwrap();
        d.dispatch(()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(d.count(), 1);
    }

    #[test]
    fn test_handler_error_aborts_pass() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let failing = d.subscribe(Handler::signal(|_ev: &EventContext| -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }));
        d.subscribe(counter(&hits));

        let err = d.dispatch(()).unwrap_err();
        assert_eq!(err.subscription(), Some(failing.id()));
        assert_eq!(err.as_label(), "dispatch_handler_failed");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panic_propagates_and_consumes_once() {
        let d = SignalDispatcher::new();
        let boom = Handler::signal::<_, ()>(|_ev: &EventContext| panic!("boom"));
        d.one(boom.clone());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| d.dispatch(())));
        assert!(result.is_err());
        assert!(!d.has(&boom));
    }

    #[test]
    fn test_payload_flavors() {
        let simple = SimpleEventDispatcher::<u32>::new();
        let sum = Arc::new(AtomicUsize::new(0));
        {
            let sum = Arc::clone(&sum);
            simple.subscribe(Handler::simple(move |n: &u32, _ev: &EventContext| {
                sum.fetch_add(*n as usize, Ordering::SeqCst);
            }));
        }
        simple.dispatch(5).unwrap();
        simple.dispatch(7).unwrap();
        assert_eq!(sum.load(Ordering::SeqCst), 12);

        let sent = SenderEventDispatcher::<&'static str, u8>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            sent.subscribe(Handler::with_sender(
                move |from: &&'static str, n: &u8, _ev: &EventContext| seen.lock().push((*from, *n)),
            ));
        }
        sent.dispatch(("door", 1)).unwrap();
        assert_eq!(*seen.lock(), vec![("door", 1)]);
    }

    #[test]
    fn test_deferred_requires_runtime() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = counter(&hits);
        d.one(h.clone());

        let err = d.dispatch_deferred(()).unwrap_err();
        assert!(matches!(err, DispatchError::NoRuntime));
        assert!(d.has(&h));
    }

    #[tokio::test]
    async fn test_deferred_runs_every_handler_later() {
        let d = SignalDispatcher::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        {
            let first = Arc::clone(&first);
            d.subscribe(Handler::signal(move |ev: &EventContext| {
                first.fetch_add(1, Ordering::SeqCst);
                ev.stop_propagation();
            }));
        }
        d.subscribe(counter(&second));

        let deferred = d.dispatch_deferred(()).unwrap();
        assert_eq!(deferred.len(), 2);
        assert_eq!(first.load(Ordering::SeqCst), 0);

        deferred.join().await.unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deferred_removes_once_at_schedule_time() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = counter(&hits);
        d.one(h.clone());

        let deferred = d.dispatch_deferred(()).unwrap();
        assert!(!d.has(&h));
        assert!(d.dispatch_deferred(()).unwrap().is_empty());

        deferred.join().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deferred_surfaces_errors_and_panics() {
        let d = SignalDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let failing = d.subscribe(Handler::signal(|_ev: &EventContext| -> anyhow::Result<()> {
            Err(anyhow::anyhow!("late failure"))
        }));
        d.subscribe(counter(&hits));

        let err = d.dispatch_deferred(()).unwrap().join().await.unwrap_err();
        assert_eq!(err.subscription(), Some(failing.id()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        d.clear();
        let panicking = d.subscribe(Handler::signal::<_, ()>(|_ev: &EventContext| panic!("kaput")));
        let err = d.dispatch_deferred(()).unwrap().join().await.unwrap_err();
        match err {
            DispatchError::Panicked {
                subscription,
                message,
            } => {
                assert_eq!(subscription, panicking.id());
                assert_eq!(message, "kaput");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
