//! Snapshots of host documents.
//!
//! The host owns actors, tokens, combats, and their participants. The sync
//! layer only ever sees these read-only snapshots and asks the host to
//! persist changes through patches.

use serde::{Deserialize, Serialize};

use crate::core::{ActorId, CombatId, CombatantId, SceneId, TargetId, TokenId};

/// Creature type shared by actors and combat participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreatureKind {
    /// Player character.
    Character,
    Npc,
    Minion,
    SoloMonster,
}

impl CreatureKind {
    /// Whether this is a player character.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, CreatureKind::Character)
    }
}

/// An actor: the authoritative owner of health.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: ActorId,
    pub kind: CreatureKind,

    /// Current hit points. `None` when the stored value is not a number.
    pub hp_value: Option<f64>,

    /// Whether the actor exposes a damage-application capability.
    pub can_take_damage: bool,

    /// Composite ids of every token placement representing this actor.
    #[serde(default)]
    pub dependent_tokens: Vec<TargetId>,
}

impl ActorRecord {
    /// Create an actor with the given health.
    pub fn new(id: impl Into<String>, kind: CreatureKind, hp_value: f64) -> Self {
        Self {
            id: ActorId::new(id),
            kind,
            hp_value: Some(hp_value),
            can_take_damage: true,
            dependent_tokens: Vec::new(),
        }
    }

    /// Finite health value, if any.
    #[must_use]
    pub fn finite_hp(&self) -> Option<f64> {
        self.hp_value.filter(|hp| hp.is_finite())
    }
}

/// Direct link from a token to its participant record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantLink {
    pub combat: CombatId,
    pub combatant: CombatantId,
}

/// A token placement in a scene.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub scene: SceneId,
    pub token: TokenId,

    /// Actor represented by the token, if any.
    pub actor: Option<ActorId>,

    /// Cached participant link, when the host keeps one.
    pub combatant: Option<ParticipantLink>,
}

impl TokenRecord {
    /// Composite identifier of this placement.
    #[must_use]
    pub fn target_id(&self) -> TargetId {
        TargetId::for_token(&self.scene, &self.token)
    }
}

/// A participant in one combat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantRecord {
    pub id: CombatantId,
    pub kind: CreatureKind,
    pub actor: Option<ActorId>,
    pub scene: Option<SceneId>,
    pub token: Option<TokenId>,
    pub defeated: bool,

    /// Remaining base actions this round.
    pub actions_base: i64,

    /// One-time Defend reaction still unspent.
    pub defend_available: bool,
}

impl CombatantRecord {
    /// Create a participant for a token placement.
    pub fn new(
        id: impl Into<String>,
        kind: CreatureKind,
        actor: &ActorId,
        scene: &SceneId,
        token: &TokenId,
    ) -> Self {
        Self {
            id: CombatantId::new(id),
            kind,
            actor: Some(actor.clone()),
            scene: Some(scene.clone()),
            token: Some(token.clone()),
            defeated: false,
            actions_base: 0,
            defend_available: false,
        }
    }

    /// Composite token id, or `None` when the scene or token is missing.
    #[must_use]
    pub fn target_id(&self) -> Option<TargetId> {
        match (&self.scene, &self.token) {
            (Some(scene), Some(token)) => Some(TargetId::for_token(scene, token)),
            _ => None,
        }
    }

    /// Apply a persisted patch to this snapshot.
    pub fn apply_patch(&mut self, patch: &CombatantPatch) {
        if let Some(defeated) = patch.defeated {
            self.defeated = defeated;
        }
        if let Some(actions) = patch.actions_base {
            self.actions_base = actions;
        }
        if let Some(available) = patch.defend_available {
            self.defend_available = available;
        }
    }
}

/// A combat encounter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatRecord {
    pub id: CombatId,

    /// Scene the combat is scoped to. `None` for unlinked combats.
    pub scene: Option<SceneId>,

    /// Round counter. Zero before the combat starts.
    pub round: u32,

    /// Index into `combatants` of the turn holder.
    pub turn: Option<usize>,

    /// Participants in turn order.
    pub combatants: Vec<CombatantRecord>,
}

impl CombatRecord {
    /// Create an empty, unstarted combat.
    pub fn new(id: impl Into<String>, scene: Option<SceneId>) -> Self {
        Self {
            id: CombatId::new(id),
            scene,
            round: 0,
            turn: None,
            combatants: Vec::new(),
        }
    }

    /// The participant currently holding the turn.
    #[must_use]
    pub fn current_combatant(&self) -> Option<&CombatantRecord> {
        self.combatants.get(self.turn?)
    }

    /// Find a participant by id.
    #[must_use]
    pub fn combatant(&self, id: &CombatantId) -> Option<&CombatantRecord> {
        self.combatants.iter().find(|c| &c.id == id)
    }

    /// Mutable participant lookup.
    pub fn combatant_mut(&mut self, id: &CombatantId) -> Option<&mut CombatantRecord> {
        self.combatants.iter_mut().find(|c| &c.id == id)
    }
}

/// Partial update of one participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantPatch {
    pub id: CombatantId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defeated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_base: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defend_available: Option<bool>,
}

impl CombatantPatch {
    /// Create an empty patch for a participant.
    pub fn new(id: CombatantId) -> Self {
        Self {
            id,
            defeated: None,
            actions_base: None,
            defend_available: None,
        }
    }

    /// Set the defeated flag (builder pattern).
    #[must_use]
    pub fn defeated(mut self, defeated: bool) -> Self {
        self.defeated = Some(defeated);
        self
    }

    /// Set the remaining base actions (builder pattern).
    #[must_use]
    pub fn actions_base(mut self, actions: i64) -> Self {
        self.actions_base = Some(actions);
        self
    }

    /// Set Defend availability (builder pattern).
    #[must_use]
    pub fn defend_available(mut self, available: bool) -> Self {
        self.defend_available = Some(available);
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defeated.is_none() && self.actions_base.is_none() && self.defend_available.is_none()
    }
}
