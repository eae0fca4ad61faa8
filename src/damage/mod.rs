//! Damage application.
//!
//! [`DamageResolver`] applies a card's damage to each target, honoring
//! stored Defend choices and consuming the one-time reaction.

mod resolver;

pub use resolver::{DamageReport, DamageResolver, TargetOutcome};
