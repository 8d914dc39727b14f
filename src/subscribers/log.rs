//! # LogWriter: tracing subscriber for any flavor
//!
//! A minimal [`Subscribe`] implementation that records every event it receives through
//! `tracing` at `INFO` level. Use it while debugging an event flow or in demos.
//!
//! ## Example output
//! ```text
//! INFO typed_events: event flavor="simple" subscription=#1 args=42
//! INFO typed_events: event flavor="signal" subscription=#3 args=()
//! ```

use std::fmt;

use async_trait::async_trait;

use crate::error::HandlerResult;
use crate::events::{EventContext, Flavor};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<F> Subscribe<F> for LogWriter
where
    F: Flavor,
    F::Args: fmt::Debug,
{
    async fn on_event(&self, args: F::Args, ctx: EventContext) -> HandlerResult {
        tracing::info!(
            flavor = F::NAME,
            subscription = %ctx.subscription_id(),
            args = ?args,
            "event"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
