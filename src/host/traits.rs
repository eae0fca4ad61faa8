//! Host collaborator traits.
//!
//! The host document framework provides reads, permission checks, writes,
//! and user notifications. Hosts implement these traits; every sync
//! component is generic over the subset it needs.
//!
//! ## Implementation Notes
//!
//! - Reads return snapshots. They must reflect every write that returned.
//! - A write that returns `Ok` is acknowledged; callers issue writes one at
//!   a time and rely on that ordering.
//! - `update_combatants` must apply the whole batch as one multi-record
//!   update.

use crate::card::{ActivationCard, CardPatch};
use crate::core::{ActorId, CombatId, HostError, MessageId, Severity, TargetId, UserRecord};

use super::records::{ActorRecord, CombatRecord, CombatantPatch, TokenRecord};

/// Kind of modification checked by [`Permissions::can_user_modify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// Document ownership levels, weakest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PermissionLevel {
    None,
    Limited,
    Observer,
    Owner,
}

/// Options forwarded to an actor's damage application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageOptions {
    /// Skip armor mitigation.
    pub ignore_armor: bool,

    /// Free-form outcome label, passed through verbatim.
    pub outcome: Option<String>,
}

impl DamageOptions {
    /// Default options: armor applies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `ignore_armor` (builder pattern).
    #[must_use]
    pub fn ignore_armor(mut self, ignore: bool) -> Self {
        self.ignore_armor = ignore;
        self
    }

    /// Set the outcome label (builder pattern).
    #[must_use]
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }
}

/// How a status effect is toggled on an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusToggle {
    /// Show as a full-token overlay.
    pub overlay: bool,
    /// Force the status on (`true`) or off (`false`).
    pub active: bool,
}

/// Read access to host documents.
pub trait Documents {
    /// Get a chat card by id.
    fn card(&self, id: &MessageId) -> Option<ActivationCard>;

    /// Resolve a composite token id to its placement.
    fn resolve_token(&self, target: &TargetId) -> Option<TokenRecord>;

    /// Get an actor by id.
    fn actor(&self, id: &ActorId) -> Option<ActorRecord>;

    /// All combats, in collection order.
    fn combats(&self) -> Vec<CombatRecord>;

    /// The combat currently running for this session, if any.
    fn active_combat(&self) -> Option<CombatId>;

    /// The combat currently shown in the tracker, if any.
    fn viewed_combat(&self) -> Option<CombatId>;

    /// Get a combat by id.
    ///
    /// Default implementation scans [`Documents::combats`].
    fn combat(&self, id: &CombatId) -> Option<CombatRecord> {
        self.combats().into_iter().find(|combat| &combat.id == id)
    }
}

/// Permission queries.
pub trait Permissions {
    /// Whether `user` may perform `operation` on the card.
    fn can_user_modify(&self, user: &UserRecord, card: &ActivationCard, operation: Operation)
        -> bool;

    /// Whether `user` holds at least `level` on the actor.
    fn test_user_permission(
        &self,
        user: &UserRecord,
        actor: &ActorRecord,
        level: PermissionLevel,
    ) -> bool;
}

/// Write access to host documents.
pub trait Persistence {
    /// Persist a card patch and return the updated card.
    fn update_card(&mut self, id: &MessageId, patch: CardPatch)
        -> Result<ActivationCard, HostError>;

    /// Persist a single participant patch.
    fn update_combatant(&mut self, combat: &CombatId, patch: CombatantPatch)
        -> Result<(), HostError>;

    /// Persist several participant patches as one batched update.
    fn update_combatants(
        &mut self,
        combat: &CombatId,
        patches: Vec<CombatantPatch>,
    ) -> Result<(), HostError>;

    /// Apply damage through the actor's own damage rules.
    fn apply_actor_damage(
        &mut self,
        actor: &ActorId,
        amount: i64,
        options: &DamageOptions,
    ) -> Result<(), HostError>;

    /// Toggle a status effect on an actor.
    fn toggle_status_effect(
        &mut self,
        actor: &ActorId,
        status_id: &str,
        toggle: StatusToggle,
    ) -> Result<(), HostError>;

    /// Advance a combat to its next turn.
    fn next_turn(&mut self, combat: &CombatId) -> Result<(), HostError>;
}

/// User-visible toast notifications.
pub trait Notifier {
    /// Show a notification.
    fn notify(&mut self, severity: Severity, message: &str);

    /// Show a warning.
    fn warn(&mut self, message: &str) {
        self.notify(Severity::Warning, message);
    }

    /// Show an error.
    fn error(&mut self, message: &str) {
        self.notify(Severity::Error, message);
    }
}

/// Everything the sync layer needs from a host.
pub trait Host: Documents + Permissions + Persistence + Notifier {}

impl<T: Documents + Permissions + Persistence + Notifier> Host for T {}
