//! Defend reaction coordination.
//!
//! [`DefendCoordinator`] answers "may this target defend", "may this user
//! choose for it", and stores the per-target decision on the card.

mod coordinator;

pub use coordinator::DefendCoordinator;
