//! Document change events.
//!
//! The host publishes one event per persisted change. Each event carries a
//! snapshot of the changed document, the JSON delta that was written, and
//! the write options, mirroring what host hooks hand to their listeners.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::ActivationCard;
use crate::core::{CombatId, UserRecord};
use crate::host::{ActorRecord, CombatantRecord};

/// Event name used for listener registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    ActorUpdated,
    CardUpdated,
    CombatantUpdated,
    CombatantCreated,
    UserUpdated,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChangeKind::ActorUpdated => "updateActor",
            ChangeKind::CardUpdated => "updateChatMessage",
            ChangeKind::CombatantUpdated => "updateCombatant",
            ChangeKind::CombatantCreated => "createCombatant",
            ChangeKind::UserUpdated => "updateUser",
        })
    }
}

/// Options the write was issued with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOptions {
    /// `false` marks a non-substantive write that listeners should ignore.
    pub diff: bool,
}

impl Default for ChangeOptions {
    fn default() -> Self {
        Self { diff: true }
    }
}

impl ChangeOptions {
    /// Options of a cosmetic write.
    #[must_use]
    pub const fn silent() -> Self {
        Self { diff: false }
    }
}

/// A persisted document change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChangeEvent {
    ActorUpdated {
        actor: ActorRecord,
        delta: Value,
        options: ChangeOptions,
    },
    CardUpdated {
        card: ActivationCard,
        delta: Value,
        options: ChangeOptions,
    },
    CombatantUpdated {
        combat: CombatId,
        combatant: CombatantRecord,
        delta: Value,
        options: ChangeOptions,
    },
    CombatantCreated {
        combat: CombatId,
        combatant: CombatantRecord,
    },
    UserUpdated {
        user: UserRecord,
        delta: Value,
        options: ChangeOptions,
    },
}

impl ChangeEvent {
    /// Event name for dispatch.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::ActorUpdated { .. } => ChangeKind::ActorUpdated,
            ChangeEvent::CardUpdated { .. } => ChangeKind::CardUpdated,
            ChangeEvent::CombatantUpdated { .. } => ChangeKind::CombatantUpdated,
            ChangeEvent::CombatantCreated { .. } => ChangeKind::CombatantCreated,
            ChangeEvent::UserUpdated { .. } => ChangeKind::UserUpdated,
        }
    }

    /// Write options. Creation events are always substantive.
    #[must_use]
    pub fn options(&self) -> ChangeOptions {
        match self {
            ChangeEvent::ActorUpdated { options, .. }
            | ChangeEvent::CardUpdated { options, .. }
            | ChangeEvent::CombatantUpdated { options, .. }
            | ChangeEvent::UserUpdated { options, .. } => *options,
            ChangeEvent::CombatantCreated { .. } => ChangeOptions::default(),
        }
    }

    /// Whether listeners should treat this change as substantive.
    #[must_use]
    pub fn is_diff(&self) -> bool {
        self.options().diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CreatureKind;
    use serde_json::json;

    #[test]
    fn test_kind_and_options() {
        let event = ChangeEvent::ActorUpdated {
            actor: ActorRecord::new("a1", CreatureKind::Npc, 4.0),
            delta: json!({}),
            options: ChangeOptions::silent(),
        };
        assert_eq!(event.kind(), ChangeKind::ActorUpdated);
        assert!(!event.is_diff());
        assert_eq!(event.kind().to_string(), "updateActor");
    }

    #[test]
    fn test_user_event_default_options() {
        let event = ChangeEvent::UserUpdated {
            user: UserRecord::player("u1"),
            delta: json!({ "name": "x" }),
            options: ChangeOptions::default(),
        };
        assert!(event.is_diff());
        assert_eq!(event.kind(), ChangeKind::UserUpdated);
    }
}
