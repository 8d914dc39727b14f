//! Dispatch core: subscription lists, dispatchers and the named registry.
//!
//! Internal modules:
//! - [`list`]: the live, ordered subscription list shared by every handle;
//! - [`dispatcher`]: subscription management and the dispatcher aliases;
//! - [`runner`]: synchronous and deferred dispatch for sync handlers;
//! - [`pipeline`]: sequential and deferred dispatch for async handlers;
//! - [`handle`]: the read-only facade;
//! - [`deferred`]: join handles of a deferred dispatch;
//! - [`registry`]: string-keyed memo map of dispatchers;
//! - [`config`]: dispatcher configuration.

mod config;
mod deferred;
mod dispatcher;
mod handle;
mod list;
mod pipeline;
mod registry;
mod runner;

pub use config::Config;
pub use deferred::Deferred;
pub use dispatcher::{
    AsyncEventDispatcher, Dispatcher, EventDispatcher, Propagation, SenderEventDispatcher,
    SignalDispatcher, SimpleEventDispatcher,
};
pub use handle::EventHandle;
pub use registry::{AsyncEventDispatcherRegistry, EventDispatcherRegistry, EventRegistry};
