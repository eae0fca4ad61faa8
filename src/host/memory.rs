//! In-memory host.
//!
//! `MemoryWorld` keeps every document in plain collections, records every
//! write it receives, and queues a change event per write. Call
//! [`MemoryWorld::publish`] to deliver queued events to a [`ChangeHub`].
//!
//! Damage follows a minimal armor rule: unless armor is ignored, the
//! actor's armor value is subtracted from the incoming amount (never below
//! zero) before it comes off the actor's hit points.
//!
//! ```
//! use card_sync::host::{CreatureKind, ActorRecord, Documents, MemoryWorld};
//!
//! let mut world = MemoryWorld::new();
//! world.add_actor(ActorRecord::new("goblin", CreatureKind::Minion, 4.0));
//! let target = world.place_token("scene", "tok", Some("goblin"));
//!
//! let token = world.resolve_token(&target).unwrap();
//! assert_eq!(token.actor.unwrap().as_str(), "goblin");
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::json;

use crate::card::{ActivationCard, CardPatch};
use crate::core::{
    ActorId, CombatId, HostError, MessageId, SceneId, Severity, TargetId, TokenId, UserId,
    UserRecord,
};
use crate::events::{ChangeEvent, ChangeHub, ChangeOptions};

use super::records::{
    ActorRecord, CombatRecord, CombatantPatch, CombatantRecord, ParticipantLink, TokenRecord,
};
use super::traits::{
    DamageOptions, Documents, Notifier, Operation, PermissionLevel, Permissions, Persistence,
    StatusToggle,
};

/// A write received by the world, in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum Write {
    Card {
        id: MessageId,
        patch: CardPatch,
    },
    Combatant {
        combat: CombatId,
        patch: CombatantPatch,
    },
    Combatants {
        combat: CombatId,
        patches: Vec<CombatantPatch>,
    },
    Damage {
        actor: ActorId,
        amount: i64,
        options: DamageOptions,
    },
    Status {
        actor: ActorId,
        status_id: String,
        toggle: StatusToggle,
    },
    NextTurn {
        combat: CombatId,
    },
}

/// In-memory host documents.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    cards: FxHashMap<MessageId, ActivationCard>,
    actors: FxHashMap<ActorId, ActorRecord>,
    armor: FxHashMap<ActorId, i64>,
    tokens: FxHashMap<TargetId, TokenRecord>,
    combats: Vec<CombatRecord>,
    active_combat: Option<CombatId>,
    viewed_combat: Option<CombatId>,
    owners: FxHashMap<ActorId, FxHashSet<UserId>>,
    statuses: FxHashMap<ActorId, FxHashSet<String>>,
    reject_writes: bool,
    rejected_batches: FxHashSet<CombatId>,

    /// Every write received, in order.
    pub writes: Vec<Write>,

    /// Every notification shown, in order.
    pub notifications: Vec<(Severity, String)>,

    outbox: Vec<ChangeEvent>,
}

impl MemoryWorld {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Setup ===

    /// Store a card.
    pub fn add_card(&mut self, card: ActivationCard) {
        self.cards.insert(card.id.clone(), card);
    }

    /// Store an actor.
    pub fn add_actor(&mut self, actor: ActorRecord) {
        self.actors.insert(actor.id.clone(), actor);
    }

    /// Set an actor's armor value.
    pub fn set_armor(&mut self, actor: &str, armor: i64) {
        self.armor.insert(ActorId::new(actor), armor);
    }

    /// Place a token in a scene and return its composite id.
    ///
    /// The token is registered as a dependent token of its actor.
    pub fn place_token(&mut self, scene: &str, token: &str, actor: Option<&str>) -> TargetId {
        let record = TokenRecord {
            scene: SceneId::new(scene),
            token: TokenId::new(token),
            actor: actor.map(ActorId::new),
            combatant: None,
        };
        let target = record.target_id();

        if let Some(actor) = record.actor.as_ref().and_then(|id| self.actors.get_mut(id)) {
            if !actor.dependent_tokens.contains(&target) {
                actor.dependent_tokens.push(target.clone());
            }
        }
        self.tokens.insert(target.clone(), record);
        target
    }

    /// Cache a direct token-to-participant link.
    pub fn link_token(&mut self, target: &TargetId, combat: &str, combatant: &str) {
        if let Some(token) = self.tokens.get_mut(target) {
            token.combatant = Some(ParticipantLink {
                combat: CombatId::new(combat),
                combatant: combatant.into(),
            });
        }
    }

    /// Store a combat.
    pub fn add_combat(&mut self, combat: CombatRecord) {
        self.combats.push(combat);
    }

    /// Add a participant to a combat and queue a creation event.
    pub fn add_combatant(&mut self, combat: &str, combatant: CombatantRecord) {
        let combat_id = CombatId::new(combat);
        let Some(record) = self.combats.iter_mut().find(|c| c.id == combat_id) else {
            return;
        };
        record.combatants.push(combatant.clone());
        self.outbox.push(ChangeEvent::CombatantCreated {
            combat: combat_id,
            combatant,
        });
    }

    /// Set the session's active combat.
    pub fn set_active_combat(&mut self, combat: Option<&str>) {
        self.active_combat = combat.map(CombatId::new);
    }

    /// Set the combat shown in the tracker.
    pub fn set_viewed_combat(&mut self, combat: Option<&str>) {
        self.viewed_combat = combat.map(CombatId::new);
    }

    /// Grant a user ownership of an actor.
    pub fn grant_owner(&mut self, actor: &str, user: &str) {
        self.owners
            .entry(ActorId::new(actor))
            .or_default()
            .insert(UserId::new(user));
    }

    /// Make every subsequent write fail.
    pub fn reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    /// Make participant batch updates to one combat fail. Other writes to
    /// that combat, such as advancing the turn, still succeed.
    pub fn reject_batches(&mut self, combat: &str) {
        self.rejected_batches.insert(CombatId::new(combat));
    }

    // === External changes ===

    /// Overwrite an actor's health and queue the change.
    pub fn set_hp(&mut self, actor: &str, hp_value: Option<f64>) {
        let Some(record) = self.actors.get_mut(&ActorId::new(actor)) else {
            return;
        };
        record.hp_value = hp_value;
        self.outbox.push(ChangeEvent::ActorUpdated {
            actor: record.clone(),
            delta: hp_delta(hp_value),
            options: ChangeOptions::default(),
        });
    }

    /// Queue an arbitrary actor change that does not touch health.
    pub fn touch_actor(&mut self, actor: &str, options: ChangeOptions) {
        let Some(record) = self.actors.get(&ActorId::new(actor)) else {
            return;
        };
        self.outbox.push(ChangeEvent::ActorUpdated {
            actor: record.clone(),
            delta: json!({ "name": record.id.as_str() }),
            options,
        });
    }

    /// Queue a user change.
    pub fn touch_user(&mut self, user: UserRecord, options: ChangeOptions) {
        self.outbox.push(ChangeEvent::UserUpdated {
            user,
            delta: json!({ "color": "#ffffff" }),
            options,
        });
    }

    // === Inspection ===

    /// Drain queued change events.
    pub fn take_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Deliver queued change events to a hub. Returns how many were sent.
    pub fn publish(&mut self, hub: &ChangeHub) -> usize {
        let events = self.take_events();
        for event in &events {
            hub.emit(event);
        }
        events.len()
    }

    /// Whether an actor currently has a status effect.
    #[must_use]
    pub fn has_status(&self, actor: &str, status_id: &str) -> bool {
        self.statuses
            .get(&ActorId::new(actor))
            .is_some_and(|set| set.contains(status_id))
    }

    /// Look up a participant snapshot.
    #[must_use]
    pub fn combatant(&self, combat: &str, combatant: &str) -> Option<&CombatantRecord> {
        self.combats
            .iter()
            .find(|c| c.id.as_str() == combat)?
            .combatant(&combatant.into())
    }

    /// Clear recorded writes and notifications.
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.notifications.clear();
    }

    fn check_writable(&self) -> Result<(), HostError> {
        if self.reject_writes {
            return Err(HostError::Rejected("writes are disabled".to_string()));
        }
        Ok(())
    }

    fn combat_mut(&mut self, id: &CombatId) -> Result<&mut CombatRecord, HostError> {
        self.combats
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| HostError::MissingDocument(id.to_string()))
    }

    fn patch_combatant(&mut self, combat: &CombatId, patch: &CombatantPatch) -> Result<(), HostError> {
        let record = self.combat_mut(combat)?;
        let combatant = record
            .combatant_mut(&patch.id)
            .ok_or_else(|| HostError::MissingDocument(patch.id.to_string()))?;
        combatant.apply_patch(patch);
        let snapshot = combatant.clone();

        self.outbox.push(ChangeEvent::CombatantUpdated {
            combat: combat.clone(),
            combatant: snapshot,
            delta: serde_json::to_value(patch).unwrap_or_default(),
            options: ChangeOptions::default(),
        });
        Ok(())
    }
}

fn hp_delta(hp_value: Option<f64>) -> serde_json::Value {
    json!({ "system": { "attributes": { "hp": { "value": hp_value } } } })
}

impl Documents for MemoryWorld {
    fn card(&self, id: &MessageId) -> Option<ActivationCard> {
        self.cards.get(id).cloned()
    }

    fn resolve_token(&self, target: &TargetId) -> Option<TokenRecord> {
        self.tokens.get(target).cloned()
    }

    fn actor(&self, id: &ActorId) -> Option<ActorRecord> {
        self.actors.get(id).cloned()
    }

    fn combats(&self) -> Vec<CombatRecord> {
        self.combats.clone()
    }

    fn active_combat(&self) -> Option<CombatId> {
        self.active_combat.clone()
    }

    fn viewed_combat(&self) -> Option<CombatId> {
        self.viewed_combat.clone()
    }

    fn combat(&self, id: &CombatId) -> Option<CombatRecord> {
        self.combats.iter().find(|c| &c.id == id).cloned()
    }
}

impl Permissions for MemoryWorld {
    fn can_user_modify(
        &self,
        user: &UserRecord,
        card: &ActivationCard,
        operation: Operation,
    ) -> bool {
        match operation {
            Operation::Create => true,
            Operation::Update | Operation::Delete => {
                user.is_gm || card.author.as_ref() == Some(&user.id)
            }
        }
    }

    fn test_user_permission(
        &self,
        user: &UserRecord,
        actor: &ActorRecord,
        level: PermissionLevel,
    ) -> bool {
        if user.is_gm || level == PermissionLevel::None {
            return true;
        }
        self.owners
            .get(&actor.id)
            .is_some_and(|owners| owners.contains(&user.id))
    }
}

impl Persistence for MemoryWorld {
    fn update_card(&mut self, id: &MessageId, patch: CardPatch) -> Result<ActivationCard, HostError> {
        self.check_writable()?;
        let card = self
            .cards
            .get_mut(id)
            .ok_or_else(|| HostError::MissingDocument(id.to_string()))?;
        card.apply_patch(&patch);
        let updated = card.clone();

        self.outbox.push(ChangeEvent::CardUpdated {
            card: updated.clone(),
            delta: patch.to_delta(),
            options: ChangeOptions::default(),
        });
        self.writes.push(Write::Card {
            id: id.clone(),
            patch,
        });
        Ok(updated)
    }

    fn update_combatant(&mut self, combat: &CombatId, patch: CombatantPatch) -> Result<(), HostError> {
        self.check_writable()?;
        self.patch_combatant(combat, &patch)?;
        self.writes.push(Write::Combatant {
            combat: combat.clone(),
            patch,
        });
        Ok(())
    }

    fn update_combatants(
        &mut self,
        combat: &CombatId,
        patches: Vec<CombatantPatch>,
    ) -> Result<(), HostError> {
        self.check_writable()?;
        if self.rejected_batches.contains(combat) {
            return Err(HostError::Rejected(format!("updates to {combat} are disabled")));
        }
        // Validate up front so the batch applies entirely or not at all.
        let record = self.combat_mut(combat)?;
        if let Some(missing) = patches.iter().find(|p| record.combatant(&p.id).is_none()) {
            return Err(HostError::MissingDocument(missing.id.to_string()));
        }

        for patch in &patches {
            self.patch_combatant(combat, patch)?;
        }
        self.writes.push(Write::Combatants {
            combat: combat.clone(),
            patches,
        });
        Ok(())
    }

    fn apply_actor_damage(
        &mut self,
        actor: &ActorId,
        amount: i64,
        options: &DamageOptions,
    ) -> Result<(), HostError> {
        self.check_writable()?;
        let armor = if options.ignore_armor {
            0
        } else {
            self.armor.get(actor).copied().unwrap_or(0)
        };
        let record = self
            .actors
            .get_mut(actor)
            .ok_or_else(|| HostError::MissingDocument(actor.to_string()))?;
        if !record.can_take_damage {
            return Err(HostError::Rejected(format!("{actor} cannot take damage")));
        }

        let taken = amount.saturating_sub(armor).max(0);
        let hp = record.hp_value.unwrap_or(0.0) - taken as f64;
        record.hp_value = Some(hp);

        self.outbox.push(ChangeEvent::ActorUpdated {
            actor: record.clone(),
            delta: hp_delta(Some(hp)),
            options: ChangeOptions::default(),
        });
        self.writes.push(Write::Damage {
            actor: actor.clone(),
            amount,
            options: options.clone(),
        });
        Ok(())
    }

    fn toggle_status_effect(
        &mut self,
        actor: &ActorId,
        status_id: &str,
        toggle: StatusToggle,
    ) -> Result<(), HostError> {
        self.check_writable()?;
        let statuses = self.statuses.entry(actor.clone()).or_default();
        if toggle.active {
            statuses.insert(status_id.to_string());
        } else {
            statuses.remove(status_id);
        }
        self.writes.push(Write::Status {
            actor: actor.clone(),
            status_id: status_id.to_string(),
            toggle,
        });
        Ok(())
    }

    fn next_turn(&mut self, combat: &CombatId) -> Result<(), HostError> {
        self.check_writable()?;
        let record = self.combat_mut(combat)?;
        let count = record.combatants.len();
        if count > 0 {
            let next = record.turn.map_or(0, |turn| turn + 1);
            if next >= count {
                record.turn = Some(0);
                record.round += 1;
            } else {
                record.turn = Some(next);
            }
        }
        self.writes.push(Write::NextTurn {
            combat: combat.clone(),
        });
        Ok(())
    }
}

impl Notifier for MemoryWorld {
    fn notify(&mut self, severity: Severity, message: &str) {
        self.notifications.push((severity, message.to_string()));
    }
}
