//! # typed-events
//!
//! **typed-events** is a small, typed publish/subscribe library for Rust.
//!
//! A publisher owns a dispatcher; consumers register handlers on it (or on its read-only
//! facade) and are invoked synchronously, deferred onto the tokio runtime, or one by one
//! through an async pipeline. Handlers run in subscription order, may subscribe for a
//! single invocation, may unsubscribe themselves, and may stop propagation to the
//! handlers after them.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Handler::simple(..) / AsyncHandler::from_subscriber(..)
//!            │
//!            ▼  subscribe / one / unsubscribe / has / clear / count
//! ┌─────────────────────┐          ┌─────────────────────┐
//! │  EventHandle        │─────────►│  Subscriptions      │◄──── Subscription (weak)
//! │  (facade, no        │          │  Mutex<Vec<Entry>>  │◄──── EventContext
//! │   dispatch)         │   ┌─────►│  (live, ordered)    │
//! └─────────────────────┘   │      └──────────┬──────────┘
//!            ▲              │                 │ snapshot()
//!            │ as_event()   │                 ▼
//! ┌──────────┴──────────────┴┐       ┌────────────────────┐
//! │  Dispatcher<H>           │──────►│ dispatch pass      │
//! │  EventDispatcher<F>      │       │  h1 ─► h2 ─► h3    │
//! │  AsyncEventDispatcher<F> │       │  (stop / once /    │
//! └──────────────────────────┘       │   first error)     │
//!            ▲                       └────────────────────┘
//!            │ get(name)
//! ┌──────────┴──────────────┐
//! │  EventRegistry<H>       │
//! │  name ─► Dispatcher     │
//! └─────────────────────────┘
//! ```
//!
//! ### Dispatch pass
//! ```text
//! snapshot = live list (copy)
//! for entry in snapshot {
//!   ├─► once && already executed ─► skip
//!   ├─► handler(args, ctx)        ─► Err ─► return Err(DispatchError::Handler)
//!   ├─► once ─► remove from live list
//!   └─► ctx.stop_propagation() called ─► return Stopped
//! }
//! return Completed
//! ```
//!
//! ## Features
//! | Area             | Description                                                       | Key types / traits                                   |
//! |------------------|-------------------------------------------------------------------|------------------------------------------------------|
//! | **Flavors**      | Argument shape of an event: none, one payload, sender + payload.  | [`Signal`], [`Simple`], [`WithSender`], [`Flavor`]   |
//! | **Handlers**     | Identity-bearing callbacks, closures or objects.                  | [`Handler`], [`AsyncHandler`], [`Subscribe`]         |
//! | **Dispatchers**  | Sync, deferred and sequential-async dispatch.                     | [`EventDispatcher`], [`AsyncEventDispatcher`]        |
//! | **Facade**       | Subscribe-only view handed to consumers.                          | [`EventHandle`]                                      |
//! | **Interaction**  | Per-invocation unsubscribe and stop propagation.                  | [`EventContext`], [`Subscription`]                   |
//! | **Registry**     | Dispatchers looked up by name, created on demand.                 | [`EventRegistry`]                                    |
//! | **Errors**       | Handler failures surfaced to the dispatching caller.              | [`DispatchError`], [`HandlerResult`]                 |
//! | **Configuration**| Label and initial capacity of a dispatcher.                       | [`Config`]                                           |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` subscriber _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use typed_events::{
//!     EventContext, EventDispatcher, EventHandle, Handler, Propagation, Simple,
//! };
//!
//! struct Door {
//!     opened: EventDispatcher<Simple<String>>,
//! }
//!
//! impl Door {
//!     fn on_open(&self) -> &EventHandle<Handler<Simple<String>>> {
//!         self.opened.as_event()
//!     }
//!
//!     fn open(&self, who: &str) -> Result<Propagation, typed_events::DispatchError> {
//!         self.opened.dispatch(who.to_string())
//!     }
//! }
//!
//! let door = Door { opened: EventDispatcher::new() };
//! let visits = Arc::new(AtomicUsize::new(0));
//!
//! // Greet only the first visitor.
//! door.on_open().one(Handler::simple(|who: &String, _ev: &EventContext| {
//!     println!("welcome, {who}");
//! }));
//!
//! // Count everyone, but keep intruders from reaching later handlers.
//! let counter = Arc::clone(&visits);
//! door.on_open().subscribe(Handler::simple(move |who: &String, ev: &EventContext| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     if who == "intruder" {
//!         ev.stop_propagation();
//!     }
//! }));
//!
//! assert_eq!(door.open("alice").unwrap(), Propagation::Completed);
//! assert_eq!(door.open("intruder").unwrap(), Propagation::Stopped);
//! assert_eq!(visits.load(Ordering::SeqCst), 2);
//! assert_eq!(door.on_open().count(), 1);
//! ```
//!
//! ## Async example
//! ```rust
//! use typed_events::{AsyncEventDispatcher, AsyncHandler, EventContext, Signal};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), typed_events::DispatchError> {
//!     let ticks = AsyncEventDispatcher::<Signal>::new();
//!
//!     ticks.subscribe(AsyncHandler::signal(|ev: EventContext| async move {
//!         println!("tick for {}", ev.subscription_id());
//!     }));
//!
//!     // One by one, awaiting each handler.
//!     ticks.dispatch(()).await?;
//!
//!     // Each handler on its own task.
//!     ticks.dispatch_deferred(())?.join().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use core::{
    AsyncEventDispatcher, AsyncEventDispatcherRegistry, Config, Deferred, Dispatcher,
    EventDispatcher, EventDispatcherRegistry, EventHandle, EventRegistry, Propagation,
    SenderEventDispatcher, SignalDispatcher, SimpleEventDispatcher,
};
pub use error::{DispatchError, HandlerResult};
pub use events::{EventContext, Flavor, Signal, Simple, WithSender};
pub use subscribers::{
    AsyncHandler, Handler, HandlerReturn, Listener, Subscribe, Subscription, SubscriptionId,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
