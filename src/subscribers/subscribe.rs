//! # Object-style async subscribers.
//!
//! `Subscribe` is the extension point for plugging stateful handlers (structs rather than
//! closures) into an [`AsyncEventDispatcher`](crate::AsyncEventDispatcher). Wrap the
//! subscriber with [`AsyncHandler::from_subscriber`](crate::AsyncHandler::from_subscriber)
//! and subscribe the resulting handler.
//!
//! ## Contract
//! - `on_event` receives an owned clone of the dispatch arguments and its own
//!   [`EventContext`].
//! - During `dispatch(..).await` the next handler does not start before the returned
//!   future resolves.
//! - Returning `Err` aborts the pass; the error is surfaced to the dispatch caller.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use typed_events::{AsyncHandler, EventContext, HandlerResult, Simple, Subscribe};
//!
//! #[derive(Default)]
//! struct Audit {
//!     total: AtomicU64,
//! }
//!
//! #[async_trait]
//! impl Subscribe<Simple<u64>> for Audit {
//!     async fn on_event(&self, amount: u64, _ev: EventContext) -> HandlerResult {
//!         self.total.fetch_add(amount, Ordering::SeqCst);
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//!
//! let handler = AsyncHandler::<Simple<u64>>::from_subscriber(Arc::new(Audit::default()));
//! # let _ = handler;
//! ```

use async_trait::async_trait;

use crate::error::HandlerResult;
use crate::events::{EventContext, Flavor};

/// Contract for object-style async subscribers of flavor `F`.
#[async_trait]
pub trait Subscribe<F: Flavor>: Send + Sync + 'static {
    /// Handle one dispatched event.
    ///
    /// # Parameters
    /// - `args`: owned clone of the dispatch arguments
    /// - `ctx`: interaction token for this invocation
    async fn on_event(&self, args: F::Args, ctx: EventContext) -> HandlerResult;

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
