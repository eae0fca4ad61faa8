//! Core types: identifiers, session context, configuration, errors, and
//! nested-path helpers.
//!
//! Everything here is independent of the host document layer.

pub mod config;
pub mod error;
pub mod ids;
pub mod path;
pub mod session;

pub use config::SyncConfig;
pub use error::{CardAction, CardError, Denied, HostError, Selection, Severity};
pub use ids::{ActorId, CombatId, CombatantId, MessageId, SceneId, TargetId, TokenId, UserId};
pub use session::{Session, UserRecord};
