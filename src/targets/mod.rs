//! Activation card targets.
//!
//! - [`TargetRegistry`]: add, remove, and dedupe card targets
//! - [`resolve_token`] / [`resolve_actor`]: composite id to host records
//! - [`find_participant`]: token to combat participant, in combat priority order

mod participant;
mod registry;

pub use participant::{find_participant, resolve_actor, resolve_token, Participant};
pub use registry::TargetRegistry;
