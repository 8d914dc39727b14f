//! # Event flavors.
//!
//! A flavor fixes the **argument shape** handlers receive. The dispatch engine is written
//! once, generic over [`Flavor`]; the three shapes below are type-level markers only.
//!
//! | Flavor              | Dispatch args | Sync handler                        | Async handler                    |
//! |---------------------|---------------|-------------------------------------|----------------------------------|
//! | [`Signal`]          | `()`          | `Fn(&EventContext)`                 | `Fn(EventContext) -> Fut`        |
//! | [`Simple<T>`]       | `T`           | `Fn(&T, &EventContext)`             | `Fn(T, EventContext) -> Fut`     |
//! | [`WithSender<S, T>`]| `(S, T)`      | `Fn(&S, &T, &EventContext)`         | `Fn(S, T, EventContext) -> Fut`  |
//!
//! Sync handlers borrow the arguments for the duration of the call. Async handlers own a
//! clone of them, so their futures are `'static` and can be scheduled on the runtime.

use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::HandlerResult;
use crate::events::EventContext;
use crate::subscribers::Subscribe;

/// Argument shape of an event.
///
/// Implemented by [`Signal`], [`Simple`] and [`WithSender`]. The associated callback types
/// are the type-erased closures stored inside [`Handler`](crate::Handler) and
/// [`AsyncHandler`](crate::AsyncHandler).
pub trait Flavor: Send + Sync + 'static {
    /// Arguments passed to `dispatch`.
    type Args: Clone + Send + Sync + 'static;

    /// Stored synchronous callback.
    type Callback: ?Sized + Send + Sync + 'static;

    /// Stored asynchronous callback.
    type AsyncCallback: ?Sized + Send + Sync + 'static;

    /// Short name (for logs).
    const NAME: &'static str;

    /// Invokes a synchronous callback.
    fn call(callback: &Self::Callback, args: &Self::Args, ctx: &EventContext) -> HandlerResult;

    /// Starts an asynchronous callback.
    fn call_async(
        callback: &Self::AsyncCallback,
        args: Self::Args,
        ctx: EventContext,
    ) -> BoxFuture<'static, HandlerResult>;

    /// Adapts an object subscriber into an asynchronous callback.
    fn adapt(subscriber: Arc<dyn Subscribe<Self>>) -> Arc<Self::AsyncCallback>;
}

/// Event without payload.
#[derive(Debug)]
pub enum Signal {}

/// Event carrying one payload value.
pub struct Simple<T>(PhantomData<fn() -> T>);

/// Event carrying a sender reference plus one payload value.
pub struct WithSender<S, T>(PhantomData<fn() -> (S, T)>);

impl Flavor for Signal {
    type Args = ();
    type Callback = dyn Fn(&EventContext) -> HandlerResult + Send + Sync;
    type AsyncCallback = dyn Fn(EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync;

    const NAME: &'static str = "signal";

    fn call(callback: &Self::Callback, _args: &(), ctx: &EventContext) -> HandlerResult {
        callback(ctx)
    }

    fn call_async(
        callback: &Self::AsyncCallback,
        _args: (),
        ctx: EventContext,
    ) -> BoxFuture<'static, HandlerResult> {
        callback(ctx)
    }

    fn adapt(subscriber: Arc<dyn Subscribe<Self>>) -> Arc<Self::AsyncCallback> {
        let callback: Arc<
            dyn Fn(EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync,
        > = Arc::new(move |ctx: EventContext| {
            let sub = Arc::clone(&subscriber);
            async move { sub.on_event((), ctx).await }.boxed()
        });
        callback
    }
}

impl<T> Flavor for Simple<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Args = T;
    type Callback = dyn Fn(&T, &EventContext) -> HandlerResult + Send + Sync;
    type AsyncCallback =
        dyn Fn(T, EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync;

    const NAME: &'static str = "simple";

    fn call(callback: &Self::Callback, args: &T, ctx: &EventContext) -> HandlerResult {
        callback(args, ctx)
    }

    fn call_async(
        callback: &Self::AsyncCallback,
        args: T,
        ctx: EventContext,
    ) -> BoxFuture<'static, HandlerResult> {
        callback(args, ctx)
    }

    fn adapt(subscriber: Arc<dyn Subscribe<Self>>) -> Arc<Self::AsyncCallback> {
        let callback: Arc<
            dyn Fn(T, EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync,
        > = Arc::new(move |payload: T, ctx: EventContext| {
            let sub = Arc::clone(&subscriber);
            async move { sub.on_event(payload, ctx).await }.boxed()
        });
        callback
    }
}

impl<S, T> Flavor for WithSender<S, T>
where
    S: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    type Args = (S, T);
    type Callback = dyn Fn(&S, &T, &EventContext) -> HandlerResult + Send + Sync;
    type AsyncCallback =
        dyn Fn(S, T, EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync;

    const NAME: &'static str = "with_sender";

    fn call(callback: &Self::Callback, args: &(S, T), ctx: &EventContext) -> HandlerResult {
        let (sender, payload) = args;
        callback(sender, payload, ctx)
    }

    fn call_async(
        callback: &Self::AsyncCallback,
        args: (S, T),
        ctx: EventContext,
    ) -> BoxFuture<'static, HandlerResult> {
        let (sender, payload) = args;
        callback(sender, payload, ctx)
    }

    fn adapt(subscriber: Arc<dyn Subscribe<Self>>) -> Arc<Self::AsyncCallback> {
        let callback: Arc<
            dyn Fn(S, T, EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync,
        > = Arc::new(move |sender: S, payload: T, ctx: EventContext| {
            let sub = Arc::clone(&subscriber);
            async move { sub.on_event((sender, payload), ctx).await }.boxed()
        });
        callback
    }
}
