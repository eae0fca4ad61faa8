//! Damage application from activation cards.
//!
//! Damage is an authoritative game-master action. Targets are processed
//! strictly one after another: a target's damage and any Defend consumption
//! it causes are both acknowledged before the next target is resolved.

use tracing::{debug, info};

use crate::card::{ActivationCard, DefendChoice};
use crate::core::{CardAction, CardError, Denied, Session, TargetId};
use crate::host::{CombatantPatch, DamageOptions, Documents, Persistence};
use crate::targets::{find_participant, resolve_actor};

/// What happened to one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Damage applied; `mitigated` when armor was allowed to apply.
    Damaged { mitigated: bool },
    /// Damage applied after a successful Defend, which was consumed.
    Defended,
    /// Target did not resolve or cannot take damage.
    Skipped,
}

/// Per-target results of one damage application, in target order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageReport {
    pub outcomes: Vec<(TargetId, TargetOutcome)>,
}

impl DamageReport {
    /// Number of targets that took damage.
    #[must_use]
    pub fn damaged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome != TargetOutcome::Skipped)
            .count()
    }

    /// Outcome for a target, if it is on the card.
    #[must_use]
    pub fn outcome(&self, target: &TargetId) -> Option<&TargetOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == target)
            .map(|(_, outcome)| outcome)
    }
}

/// Applies card damage to every target exactly once.
pub struct DamageResolver;

impl DamageResolver {
    /// Apply `amount` damage to each of the card's targets.
    ///
    /// Non-player targets take damage with `options` as given. A player
    /// character gets armor mitigation only when it chose Defend, still has
    /// the reaction, and the caller did not force armor off; that Defend is
    /// then consumed. Unresolvable targets are skipped.
    pub fn apply_damage<H: Documents + Persistence + ?Sized>(
        host: &mut H,
        card: &ActivationCard,
        session: &Session,
        amount: i64,
        options: &DamageOptions,
    ) -> Result<DamageReport, CardError> {
        if !card.is_activation_card() {
            return Err(CardError::WrongCardType(CardAction::ApplyDamage));
        }
        if !session.is_gm() {
            return Err(CardError::PermissionDenied(Denied::ApplyDamage));
        }
        if card.targets.is_empty() {
            return Err(CardError::NoTargets);
        }

        let mut report = DamageReport::default();
        for target in card.targets.iter() {
            let outcome = Self::apply_to_target(host, card, target, amount, options)?;
            report.outcomes.push((target.clone(), outcome));
        }

        info!(card = %card.id, amount, damaged = report.damaged(), "damage applied");
        Ok(report)
    }

    fn apply_to_target<H: Documents + Persistence + ?Sized>(
        host: &mut H,
        card: &ActivationCard,
        target: &TargetId,
        amount: i64,
        options: &DamageOptions,
    ) -> Result<TargetOutcome, CardError> {
        let Some((token, actor)) = resolve_actor(&*host, target) else {
            debug!(%target, "skipping unresolvable target");
            return Ok(TargetOutcome::Skipped);
        };
        if !actor.can_take_damage {
            debug!(%target, actor = %actor.id, "skipping actor without damage handling");
            return Ok(TargetOutcome::Skipped);
        }

        if !actor.kind.is_player() {
            host.apply_actor_damage(&actor.id, amount, options)?;
            return Ok(TargetOutcome::Damaged {
                mitigated: !options.ignore_armor,
            });
        }

        let participant = find_participant(&*host, &token);
        let defend_available = participant
            .as_ref()
            .is_some_and(|p| p.combatant.defend_available);
        let selected = card.defend_choice(target) == Some(DefendChoice::Yes);
        let defended = defend_available && selected && !options.ignore_armor;

        let effective = DamageOptions {
            ignore_armor: !defended || options.ignore_armor,
            outcome: options.outcome.clone(),
        };
        host.apply_actor_damage(&actor.id, amount, &effective)?;

        match participant {
            Some(participant) if defended => {
                let patch = CombatantPatch::new(participant.combatant.id.clone())
                    .defend_available(false);
                host.update_combatant(&participant.combat, patch)?;
                info!(%target, combatant = %participant.combatant.id, "defend consumed");
                Ok(TargetOutcome::Defended)
            }
            _ => Ok(TargetOutcome::Damaged {
                mitigated: !effective.ignore_armor,
            }),
        }
    }
}
