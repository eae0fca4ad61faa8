//! Host document layer contract.
//!
//! The sync layer never owns documents. It reads snapshots through
//! [`Documents`], checks [`Permissions`], writes through [`Persistence`],
//! and reports user-facing failures through [`Notifier`]. Hosts implement
//! all four to get [`Host`].
//!
//! [`MemoryWorld`] is a complete in-memory host used by the test suite and
//! suitable for embedding in tools that have no document framework.

mod memory;
mod records;
mod traits;

pub use memory::{MemoryWorld, Write};
pub use records::{
    ActorRecord, CombatRecord, CombatantPatch, CombatantRecord, CreatureKind, ParticipantLink,
    TokenRecord,
};
pub use traits::{
    DamageOptions, Documents, Host, Notifier, Operation, PermissionLevel, Permissions,
    Persistence, StatusToggle,
};
