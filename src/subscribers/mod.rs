//! # Handlers and subscriptions.
//!
//! This module provides what a consumer hands to a dispatcher and what it gets back:
//!
//! ```text
//!   closure ──► Handler::simple(..) ──► dispatcher.subscribe(handler) ──► Subscription
//!   struct  ──► AsyncHandler::from_subscriber(..) ──┘                       │
//!                                                                           └─► unsubscribe()
//! ```
//!
//! - [`Handler`] / [`AsyncHandler`]: identity-bearing wrappers around callbacks
//! - [`Subscribe`]: async trait for object-style subscribers
//! - [`Subscription`]: removes exactly one subscription
//! - `LogWriter`: built-in subscriber that traces every event (feature `logging`)

mod handler;
#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscription;

pub use handler::{AsyncHandler, Handler, HandlerReturn, Listener};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub(crate) use subscription::{Detach, Entry};
pub use subscription::{Subscription, SubscriptionId};
