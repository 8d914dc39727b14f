//! # Dispatch pass for asynchronous handlers.
//!
//! Implements [`AsyncEventDispatcher::dispatch`] and
//! [`AsyncEventDispatcher::dispatch_deferred`].
//!
//! The awaited pass is a **sequential pipeline**: each handler future is awaited before the
//! next one is started, so stop/once/snapshot semantics are the same as the synchronous
//! pass in `runner.rs`.
//!
//! ```text
//! dispatch(args).await
//!   snapshot ─► h1(args.clone(), ctx1).await ─► h2(args.clone(), ctx2).await ─► ...
//!                      │ Err ─► return Err
//!                      └ ctx1 stopped ─► return Stopped
//!
//! dispatch_deferred(args)
//!   snapshot ─► spawn(h1(..)), spawn(h2(..)), ...  ─► Deferred
//! ```
//!
//! Dropping the `dispatch` future mid-pass abandons the remaining handlers; a once-entry
//! whose handler was in flight is still removed.

use crate::core::deferred::Deferred;
use crate::core::dispatcher::{AsyncEventDispatcher, Propagation};
use crate::core::runner::OnceCleanup;
use crate::error::DispatchError;
use crate::events::{EventContext, Flavor};

impl<F: Flavor> AsyncEventDispatcher<F> {
    /// Invokes every subscribed handler in subscription order, awaiting each one.
    ///
    /// Returns [`Propagation::Stopped`] if a handler stopped propagation, or the first
    /// handler error.
    pub async fn dispatch(&self, args: F::Args) -> Result<Propagation, DispatchError> {
        let list = self.list();
        let snapshot = list.snapshot();
        tracing::trace!(event = list.label(), handlers = snapshot.len(), "dispatch async");

        for entry in snapshot {
            let ctx = EventContext::new(list.handle(entry.id()));
            if !entry.begin() {
                continue;
            }

            let cleanup = OnceCleanup::arm(list, entry.id(), entry.is_once());
            let outcome = entry.handler().call(args.clone(), ctx.clone()).await;
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

    /// Spawns every subscribed handler future on its own tokio task.
    ///
    /// Must be called from within a tokio runtime; otherwise returns
    /// [`DispatchError::NoRuntime`] without scheduling anything.
    pub fn dispatch_deferred(&self, args: F::Args) -> Result<Deferred, DispatchError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;
        let list = self.list();
        let snapshot = list.snapshot();
        tracing::trace!(event = list.label(), handlers = snapshot.len(), "dispatch async deferred");

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
                    .call(args, ctx)
                    .await
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
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::error::HandlerResult;
    use crate::events::{Signal, Simple};
    use crate::subscribers::{AsyncHandler, Subscribe};

    #[tokio::test]
    async fn test_sequential_stop_after_two_passes() {
        let d = AsyncEventDispatcher::<Signal>::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        {
            let a = Arc::clone(&a);
            d.subscribe(AsyncHandler::signal(move |ev: EventContext| {
                let a = Arc::clone(&a);
                async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    if a.fetch_add(1, Ordering::SeqCst) + 1 > 2 {
                        ev.stop_propagation();
                    }
                }
            }));
        }
        {
            let b = Arc::clone(&b);
            d.subscribe(AsyncHandler::signal(move |_ev: EventContext| {
                let b = Arc::clone(&b);
                async move {
                    b.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        for _ in 0..4 {
            d.dispatch(()).await.unwrap();
        }

        assert_eq!(a.load(Ordering::SeqCst), 4);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_each_handler_finishes_before_next_starts() {
        let d = AsyncEventDispatcher::<Simple<u64>>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in ["slow", "fast"] {
            let log = Arc::clone(&log);
            d.subscribe(AsyncHandler::simple(move |delay: u64, _ev: EventContext| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().push(format!("{name}:start"));
                    if name == "slow" {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                    log.lock().push(format!("{name}:end"));
                }
            }));
        }

        assert_eq!(d.dispatch(20).await.unwrap(), Propagation::Completed);
        assert_eq!(
            *log.lock(),
            vec!["slow:start", "slow:end", "fast:start", "fast:end"]
        );
    }

    #[tokio::test]
    async fn test_once_and_error_abort() {
        let d = AsyncEventDispatcher::<Signal>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let failing = AsyncHandler::signal(|_ev: EventContext| async {
            Err::<(), _>(anyhow::anyhow!("broken pipe"))
        });
        let sub = d.one(failing.clone());
        {
            let hits = Arc::clone(&hits);
            d.subscribe(AsyncHandler::signal(move |_ev: EventContext| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        let err = d.dispatch(()).await.unwrap_err();
        assert_eq!(err.subscription(), Some(sub.id()));
        assert!(!d.has(&failing));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        d.dispatch(()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    struct Tally {
        seen: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl Subscribe<Simple<u32>> for Tally {
        async fn on_event(&self, value: u32, ctx: EventContext) -> HandlerResult {
            self.seen.lock().push(value);
            if value == 0 {
                ctx.unsubscribe();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_subscribe_object() {
        let d = AsyncEventDispatcher::<Simple<u32>>::new();
        let tally = Arc::new(Tally {
            seen: Mutex::new(Vec::new()),
        });
        let handler = AsyncHandler::from_subscriber(Arc::clone(&tally));
        d.subscribe(handler.clone());

        d.dispatch(3).await.unwrap();
        d.dispatch(0).await.unwrap();
        d.dispatch(9).await.unwrap();

        assert_eq!(*tally.seen.lock(), vec![3, 0]);
        assert!(!d.has(&handler));
    }

    #[tokio::test]
    async fn test_deferred_async() {
        let d = AsyncEventDispatcher::<Simple<usize>>::new();
        let sum = Arc::new(AtomicUsize::new(0));
        let h = {
            let sum = Arc::clone(&sum);
            AsyncHandler::simple(move |n: usize, _ev: EventContext| {
                let sum = Arc::clone(&sum);
                async move {
                    sum.fetch_add(n, Ordering::SeqCst);
                }
            })
        };
        d.subscribe(h.clone());
        d.one(h.clone());

        let deferred = d.dispatch_deferred(5).unwrap();
        assert_eq!(deferred.len(), 2);
        assert_eq!(d.count(), 1);

        deferred.join().await.unwrap();
        assert_eq!(sum.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_deferred_async_runs_nothing_at_schedule_time() {
        let d = AsyncEventDispatcher::<Signal>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let calls = Arc::clone(&calls);
            d.subscribe(AsyncHandler::signal(move |_ev: EventContext| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {}
            }));
        }

        let deferred = d.dispatch_deferred(()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        deferred.join().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deferred_async_early_panic_reaches_join() {
        let d = AsyncEventDispatcher::<Signal>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let early = AsyncHandler::signal(|_ev: EventContext| -> std::future::Ready<()> {
            panic!("before first poll")
        });
        let sub = d.one(early.clone());
        {
            let hits = Arc::clone(&hits);
            d.subscribe(AsyncHandler::signal(move |_ev: EventContext| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        let deferred = d.dispatch_deferred(()).unwrap();
        assert_eq!(deferred.len(), 2);
        assert!(!d.has(&early));

        match deferred.join().await.unwrap_err() {
            DispatchError::Panicked {
                subscription,
                message,
            } => {
                assert_eq!(subscription, sub.id());
                assert_eq!(message, "before first poll");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deferred_async_requires_runtime() {
        let d = AsyncEventDispatcher::<Signal>::new();
        d.subscribe(AsyncHandler::signal(|_ev: EventContext| async {}));

        assert!(matches!(
            d.dispatch_deferred(()),
            Err(DispatchError::NoRuntime)
        ));
    }
}
