//! Event shapes and the per-invocation token.
//!
//! This module groups the **type-level data model** shared by every dispatcher:
//!
//! ## Contents
//! - [`Flavor`] with its markers [`Signal`], [`Simple`], [`WithSender`]
//! - [`EventContext`] handed to each handler invocation
//!
//! See `core/mod.rs` for how dispatchers put them together.

mod context;
mod flavor;

pub use context::EventContext;
pub use flavor::{Flavor, Signal, Simple, WithSender};
