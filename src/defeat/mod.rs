//! Defeat synchronization between actors and combat participants.
//!
//! - [`DefeatReconciler`]: one reconciliation pass for an actor
//! - [`DefeatWatch`]: queues reconciliation from hub events

mod reconciler;
mod watch;

pub use reconciler::{DefeatReconciler, DefeatReport, HP_PATH};
pub use watch::DefeatWatch;
