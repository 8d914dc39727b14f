//! # Dispatcher configuration.
//!
//! Provides [`Config`], the settings a dispatcher is created with.
//!
//! Config is used in two ways:
//! 1. **Direct creation**: `EventDispatcher::with_config(config)`
//! 2. **Registry creation**: [`EventRegistry`](crate::EventRegistry) labels every dispatcher
//!    it creates with the event name.
//!
//! ## Sentinel values
//! - `label = None` → logged as `"anonymous"`
//! - `capacity = 0` → the subscription list grows on demand

use std::borrow::Cow;

/// Settings of one dispatcher.
///
/// ## Field semantics
/// - `label`: name used in tracing fields
/// - `capacity`: number of subscriptions pre-allocated in the list
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the event (for logs).
    pub label: Option<Cow<'static, str>>,

    /// Initial capacity of the subscription list.
    pub capacity: usize,
}

impl Config {
    /// Configuration with the given label and defaults for the rest.
    pub fn labeled(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Sets the initial capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Label to use in log fields.
    #[inline]
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("anonymous")
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `label = None` (anonymous dispatcher)
    /// - `capacity = 0` (grow on demand)
    fn default() -> Self {
        Self {
            label: None,
            capacity: 0,
        }
    }
}
