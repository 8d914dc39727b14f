//! # Identity-bearing handlers.
//!
//! Closures are not comparable, so handlers are wrapped once into a [`Handler`] (sync) or
//! [`AsyncHandler`] (async) and that value is what gets subscribed, looked up with `has`
//! and removed with `unsubscribe`. Clones of a handler share the same callback and compare
//! equal; two handlers built from identical closures do not.
//!
//! ## Example
//! ```rust
//! use typed_events::{EventContext, EventDispatcher, Handler, Simple};
//!
//! let dispatcher = EventDispatcher::<Simple<u32>>::new();
//! let print = Handler::simple(|n: &u32, _ev: &EventContext| println!("got {n}"));
//!
//! dispatcher.subscribe(print.clone());
//! assert!(dispatcher.has(&print));
//!
//! dispatcher.unsubscribe(&print);
//! assert!(!dispatcher.has(&print));
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::HandlerResult;
use crate::events::{EventContext, Flavor, Signal, Simple, WithSender};
use crate::subscribers::Subscribe;

/// Values a handler closure may return.
///
/// Implemented for `()` (infallible handlers) and for `Result<(), E>` with any
/// `E: Into<anyhow::Error>`.
pub trait HandlerReturn {
    /// Converts the closure output into a [`HandlerResult`].
    fn into_result(self) -> HandlerResult;
}

impl HandlerReturn for () {
    fn into_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E> HandlerReturn for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

/// A value that can be stored in a subscription list.
///
/// Lists look handlers up by identity, never by structural equality.
pub trait Listener: Clone + Send + Sync + 'static {
    /// Returns `true` if both values wrap the same callback.
    fn same_listener(&self, other: &Self) -> bool;
}

/// Synchronous handler for events of flavor `F`.
pub struct Handler<F: Flavor> {
    callback: Arc<F::Callback>,
}

impl<F: Flavor> Handler<F> {
    pub(crate) fn call(&self, args: &F::Args, ctx: &EventContext) -> HandlerResult {
        F::call(&*self.callback, args, ctx)
    }
}

impl Handler<Signal> {
    /// Wraps a payload-less callback.
    pub fn signal<C, R>(callback: C) -> Self
    where
        C: Fn(&EventContext) -> R + Send + Sync + 'static,
        R: HandlerReturn,
    {
        let callback: Arc<dyn Fn(&EventContext) -> HandlerResult + Send + Sync> =
            Arc::new(move |ctx: &EventContext| callback(ctx).into_result());
        Self { callback }
    }
}

impl<T> Handler<Simple<T>>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps a single-payload callback.
    pub fn simple<C, R>(callback: C) -> Self
    where
        C: Fn(&T, &EventContext) -> R + Send + Sync + 'static,
        R: HandlerReturn,
    {
        let callback: Arc<dyn Fn(&T, &EventContext) -> HandlerResult + Send + Sync> =
            Arc::new(move |payload: &T, ctx: &EventContext| callback(payload, ctx).into_result());
        Self { callback }
    }
}

impl<S, T> Handler<WithSender<S, T>>
where
    S: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Wraps a sender + payload callback.
    pub fn with_sender<C, R>(callback: C) -> Self
    where
        C: Fn(&S, &T, &EventContext) -> R + Send + Sync + 'static,
        R: HandlerReturn,
    {
        let callback: Arc<dyn Fn(&S, &T, &EventContext) -> HandlerResult + Send + Sync> =
            Arc::new(move |sender: &S, payload: &T, ctx: &EventContext| {
                callback(sender, payload, ctx).into_result()
            });
        Self { callback }
    }
}

impl<F: Flavor> Clone for Handler<F> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<F: Flavor> PartialEq for Handler<F> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<F: Flavor> Eq for Handler<F> {}

impl<F: Flavor> Listener for Handler<F> {
    fn same_listener(&self, other: &Self) -> bool {
        self == other
    }
}

impl<F: Flavor> fmt::Debug for Handler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler<{}>({:p})", F::NAME, Arc::as_ptr(&self.callback))
    }
}

/// Asynchronous handler for events of flavor `F`.
///
/// Each invocation gets its own clone of the dispatch arguments and of the
/// [`EventContext`], so the returned future is `'static`.
pub struct AsyncHandler<F: Flavor> {
    callback: Arc<F::AsyncCallback>,
}

impl<F: Flavor> AsyncHandler<F> {
    /// Wraps an object implementing [`Subscribe`].
    ///
    /// Every call builds a new handler identity; keep the returned value to
    /// unsubscribe later.
    pub fn from_subscriber<S>(subscriber: Arc<S>) -> Self
    where
        S: Subscribe<F>,
    {
        let subscriber: Arc<dyn Subscribe<F>> = subscriber;
        Self {
            callback: F::adapt(subscriber),
        }
    }

    pub(crate) fn call(&self, args: F::Args, ctx: EventContext) -> BoxFuture<'static, HandlerResult> {
        F::call_async(&*self.callback, args, ctx)
    }
}

impl AsyncHandler<Signal> {
    /// Wraps a payload-less async callback.
    pub fn signal<C, Fut, R>(callback: C) -> Self
    where
        C: Fn(EventContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: HandlerReturn,
    {
        let callback: Arc<
            dyn Fn(EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync,
        > = Arc::new(move |ctx: EventContext| {
            let fut = callback(ctx);
            async move { fut.await.into_result() }.boxed()
        });
        Self { callback }
    }
}

impl<T> AsyncHandler<Simple<T>>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps a single-payload async callback.
    pub fn simple<C, Fut, R>(callback: C) -> Self
    where
        C: Fn(T, EventContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: HandlerReturn,
    {
        let callback: Arc<
            dyn Fn(T, EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync,
        > = Arc::new(move |payload: T, ctx: EventContext| {
            let fut = callback(payload, ctx);
            async move { fut.await.into_result() }.boxed()
        });
        Self { callback }
    }
}

impl<S, T> AsyncHandler<WithSender<S, T>>
where
    S: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Wraps a sender + payload async callback.
    pub fn with_sender<C, Fut, R>(callback: C) -> Self
    where
        C: Fn(S, T, EventContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: HandlerReturn,
    {
        let callback: Arc<
            dyn Fn(S, T, EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync,
        > = Arc::new(move |sender: S, payload: T, ctx: EventContext| {
            let fut = callback(sender, payload, ctx);
            async move { fut.await.into_result() }.boxed()
        });
        Self { callback }
    }
}

impl<F: Flavor> Clone for AsyncHandler<F> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<F: Flavor> PartialEq for AsyncHandler<F> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<F: Flavor> Eq for AsyncHandler<F> {}

impl<F: Flavor> Listener for AsyncHandler<F> {
    fn same_listener(&self, other: &Self) -> bool {
        self == other
    }
}

impl<F: Flavor> fmt::Debug for AsyncHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AsyncHandler<{}>({:p})", F::NAME, Arc::as_ptr(&self.callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let h = Handler::signal(|_ev: &EventContext| {});
        let same = h.clone();
        let other = Handler::signal(|_ev: &EventContext| {});

        assert_eq!(h, same);
        assert!(h.same_listener(&same));
        assert_ne!(h, other);
    }

    #[test]
    fn test_fallible_closure_output() {
        let ok: Result<(), std::io::Error> = Ok(());
        assert!(ok.into_result().is_ok());

        let err: Result<(), std::io::Error> = Err(std::io::Error::other("nope"));
        let err = err.into_result().unwrap_err();
        assert_eq!(err.to_string(), "nope");

        assert!(().into_result().is_ok());
    }

    #[test]
    fn test_debug_names_flavor() {
        let h = Handler::simple(|_n: &u8, _ev: &EventContext| {});
        assert!(format!("{h:?}").starts_with("Handler<simple>("));

        let a = AsyncHandler::signal(|_ev: EventContext| async {});
        assert!(format!("{a:?}").starts_with("AsyncHandler<signal>("));
    }
}
