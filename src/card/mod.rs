//! Activation cards.
//!
//! - [`ActivationCard`]: card snapshot with targets, outcome, and defend choices
//! - [`CardSubscription`]: observer-counted change subscription for one card
//! - [`ReactiveCard`]: UI-facing handle combining both with card operations

mod activation;
mod reactive;
mod subscription;

pub use activation::{ActivationCard, CardKind, CardPatch, DefendChoice, Outcome};
pub use reactive::{ReactiveCard, Tracked};
pub use subscription::{invalidates, CardSubscription, Observer, SharedCard};
