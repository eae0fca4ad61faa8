//! Defeat reconciliation.
//!
//! Actor health is authoritative; a participant's `defeated` flag is a
//! derived copy. When an actor drops to zero or below, every non-player
//! participant that references it is marked defeated and loses its
//! remaining base actions, one batched write per combat. Player characters
//! are never touched: their defeat is decided at the table.
//!
//! Only transitions into defeat are handled. Reconciling twice is harmless
//! because participants that already match produce no update.

use tracing::{debug, info, warn};

use crate::core::{path, ActorId, CombatId, CombatantId, Session, SyncConfig};
use crate::events::ChangeEvent;
use crate::host::{ActorRecord, CombatantPatch, Documents, Persistence, StatusToggle};

/// Change-delta path of an actor's hit points.
pub const HP_PATH: &str = "system.attributes.hp.value";

/// Writes performed by one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefeatReport {
    /// Participants updated, grouped by combat in write order.
    pub batches: Vec<(CombatId, Vec<CombatantId>)>,
    /// Whether the actor's defeated status was toggled.
    pub status_toggled: bool,
    /// Combats whose turn was advanced.
    pub advanced: Vec<CombatId>,
}

impl DefeatReport {
    /// Whether the pass wrote nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty() && !self.status_toggled && self.advanced.is_empty()
    }
}

/// Propagates actor defeat into participant records.
#[derive(Clone, Debug, Default)]
pub struct DefeatReconciler {
    config: SyncConfig,
}

impl DefeatReconciler {
    /// Create a reconciler.
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// The actor whose reconciliation an event calls for, if any.
    ///
    /// Health changes on an actor and newly created participants linked to
    /// an actor both trigger reconciliation.
    #[must_use]
    pub fn trigger(&self, event: &ChangeEvent) -> Option<ActorId> {
        match event {
            ChangeEvent::ActorUpdated { actor, delta, .. } if path::value_has_path(delta, HP_PATH) => {
                Some(actor.id.clone())
            }
            ChangeEvent::CombatantCreated { combatant, .. } if self.config.reconcile_on_create => {
                combatant.actor.clone()
            }
            _ => None,
        }
    }

    /// Reconcile in response to an event. Non-triggering events do nothing.
    pub fn handle<H: Documents + Persistence + ?Sized>(
        &self,
        host: &mut H,
        session: &Session,
        event: &ChangeEvent,
    ) -> DefeatReport {
        match self.trigger(event) {
            Some(actor) => self.reconcile(host, session, &actor),
            None => DefeatReport::default(),
        }
    }

    /// Bring every participant of `actor_id` in line with the actor's health.
    ///
    /// Runs only for game-master sessions so that a single client writes.
    /// Host write failures are logged and the pass continues.
    pub fn reconcile<H: Documents + Persistence + ?Sized>(
        &self,
        host: &mut H,
        session: &Session,
        actor_id: &ActorId,
    ) -> DefeatReport {
        let mut report = DefeatReport::default();
        if !session.is_gm() {
            return report;
        }

        let Some(actor) = host.actor(actor_id) else {
            debug!(actor = %actor_id, "reconcile: unknown actor");
            return report;
        };
        let Some(hp) = actor.finite_hp() else {
            debug!(actor = %actor_id, "reconcile: health is not a finite number");
            return report;
        };
        if hp > 0.0 {
            return report;
        }

        // Snapshot before writing; turn holders are judged as they stood.
        let impacted: Vec<_> = host
            .combats()
            .into_iter()
            .filter(|combat| combat.combatants.iter().any(|c| c.actor.as_ref() == Some(actor_id)))
            .collect();
        if impacted.is_empty() {
            return report;
        }

        for combat in &impacted {
            let patches: Vec<CombatantPatch> = combat
                .combatants
                .iter()
                .filter(|c| c.actor.as_ref() == Some(actor_id) && !c.kind.is_player())
                .filter_map(|c| {
                    let mut patch = CombatantPatch::new(c.id.clone());
                    if !c.defeated {
                        patch = patch.defeated(true);
                    }
                    if c.actions_base != 0 {
                        patch = patch.actions_base(0);
                    }
                    (!patch.is_empty()).then_some(patch)
                })
                .collect();
            if patches.is_empty() {
                continue;
            }

            let ids: Vec<CombatantId> = patches.iter().map(|p| p.id.clone()).collect();
            match host.update_combatants(&combat.id, patches) {
                Ok(()) => {
                    info!(actor = %actor_id, combat = %combat.id, count = ids.len(), "participants defeated");
                    report.batches.push((combat.id.clone(), ids));
                }
                Err(err) => warn!(combat = %combat.id, %err, "defeat batch failed"),
            }
        }

        let has_non_player = impacted
            .iter()
            .flat_map(|combat| combat.combatants.iter())
            .any(|c| c.actor.as_ref() == Some(actor_id) && !c.kind.is_player());
        if has_non_player {
            self.mark_actor_defeated(host, &actor, &mut report);
        }

        if self.config.auto_advance_turn {
            for combat in &impacted {
                let holds_turn = combat.current_combatant().is_some_and(|current| {
                    current.actor.as_ref() == Some(actor_id) && !current.kind.is_player()
                });
                if !holds_turn || combat.round == 0 {
                    continue;
                }
                match host.next_turn(&combat.id) {
                    Ok(()) => {
                        info!(combat = %combat.id, "advanced past defeated turn holder");
                        report.advanced.push(combat.id.clone());
                    }
                    Err(err) => warn!(combat = %combat.id, %err, "turn advance failed"),
                }
            }
        }

        report
    }

    fn mark_actor_defeated<H: Persistence + ?Sized>(
        &self,
        host: &mut H,
        actor: &ActorRecord,
        report: &mut DefeatReport,
    ) {
        let toggle = StatusToggle {
            overlay: true,
            active: true,
        };
        match host.toggle_status_effect(&actor.id, &self.config.defeated_status_id, toggle) {
            Ok(()) => report.status_toggled = true,
            Err(err) => warn!(actor = %actor.id, %err, "defeated status toggle failed"),
        }
    }
}
