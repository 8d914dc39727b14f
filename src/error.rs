//! Error types used by dispatchers and handlers.
//!
//! This module defines:
//!
//! - [`DispatchError`]: errors surfaced by a dispatch pass.
//! - [`HandlerResult`]: the result every handler callback resolves to.
//!
//! [`DispatchError`] provides helper methods (`as_label`, `as_message`) for logging/metrics,
//! mirroring the other error types in this crate.

use thiserror::Error;

use crate::subscribers::SubscriptionId;

/// Result returned by every handler once it has been adapted into a
/// [`Handler`](crate::Handler) or [`AsyncHandler`](crate::AsyncHandler).
///
/// Closures may return `()` or `Result<(), E>` for any `E: Into<anyhow::Error>`;
/// see [`HandlerReturn`](crate::HandlerReturn).
pub type HandlerResult = Result<(), anyhow::Error>;

/// # Errors produced by a dispatch pass.
///
/// Handler failures are never swallowed: the first failing handler aborts the pass and its
/// error is returned to whoever called `dispatch`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A handler returned an error; remaining handlers of the pass were not invoked.
    #[error("handler {subscription} failed: {source}")]
    Handler {
        /// Subscription whose handler failed.
        subscription: SubscriptionId,
        /// The error returned by the handler.
        #[source]
        source: anyhow::Error,
    },

    /// A deferred handler task panicked.
    ///
    /// Only observed through [`Deferred::join`](crate::Deferred::join).
    #[error("handler {subscription} panicked: {message}")]
    Panicked {
        /// Subscription whose handler panicked.
        subscription: SubscriptionId,
        /// Panic payload rendered as text.
        message: String,
    },

    /// A deferred handler task was cancelled before it completed (runtime shutdown).
    ///
    /// Only observed through [`Deferred::join`](crate::Deferred::join).
    #[error("handler {subscription} cancelled before completion")]
    Cancelled {
        /// Subscription whose handler never completed.
        subscription: SubscriptionId,
    },

    /// Deferred dispatch was requested outside of a tokio runtime.
    ///
    /// This is a programming error: nothing was scheduled.
    #[error("deferred dispatch requires a running tokio runtime")]
    NoRuntime,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typed_events::DispatchError;
    ///
    /// assert_eq!(DispatchError::NoRuntime.as_label(), "dispatch_no_runtime");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Handler { .. } => "dispatch_handler_failed",
            DispatchError::Panicked { .. } => "dispatch_handler_panicked",
            DispatchError::Cancelled { .. } => "dispatch_handler_cancelled",
            DispatchError::NoRuntime => "dispatch_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Handler {
                subscription,
                source,
            } => format!("handler {subscription}: {source:#}"),
            DispatchError::Panicked {
                subscription,
                message,
            } => format!("handler {subscription} panicked: {message}"),
            DispatchError::Cancelled { subscription } => {
                format!("handler {subscription} cancelled before completion")
            }
            DispatchError::NoRuntime => "no tokio runtime".to_string(),
        }
    }

    /// Subscription that caused the error, if any.
    pub fn subscription(&self) -> Option<SubscriptionId> {
        match self {
            DispatchError::Handler { subscription, .. }
            | DispatchError::Panicked { subscription, .. }
            | DispatchError::Cancelled { subscription } => Some(*subscription),
            DispatchError::NoRuntime => None,
        }
    }
}
