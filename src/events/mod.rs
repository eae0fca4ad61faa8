//! Change notification plumbing.
//!
//! - [`ChangeEvent`]: a persisted document change with its delta and options
//! - [`ChangeHub`]: listener registration by event name and dispatch
//!
//! Hosts publish every persisted change into a hub. Card subscriptions and
//! the defeat watch register listeners on it.

mod event;
mod hub;

pub use event::{ChangeEvent, ChangeKind, ChangeOptions};
pub use hub::{ChangeHub, ListenerId};
