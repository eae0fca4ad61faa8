//! Target set management for activation cards.
//!
//! Targets are kept in insertion order with set semantics enforced at write
//! time. Removing a target also prunes its defend choice so that choices
//! never outlive their target.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::card::{ActivationCard, CardPatch};
use crate::core::{path, CardAction, CardError, Selection, Session, TargetId};
use crate::host::{CombatantRecord, Persistence};

/// Adds and removes card targets.
pub struct TargetRegistry;

impl TargetRegistry {
    /// Union `new_targets` into the card's targets and persist.
    ///
    /// Existing order is kept; new ids are appended in the given order and
    /// duplicates are dropped.
    pub fn add_targets<P: Persistence + ?Sized>(
        host: &mut P,
        card: &ActivationCard,
        new_targets: &[TargetId],
    ) -> Result<ActivationCard, CardError> {
        Self::add_selection(host, card, new_targets, Selection::Explicit)
    }

    /// Add the tokens the session controls on the canvas.
    pub fn add_controlled<P: Persistence + ?Sized>(
        host: &mut P,
        card: &ActivationCard,
        session: &Session,
    ) -> Result<ActivationCard, CardError> {
        Self::add_selection(host, card, &session.controlled, Selection::Controlled)
    }

    /// Add the tokens the session targets.
    pub fn add_targeted<P: Persistence + ?Sized>(
        host: &mut P,
        card: &ActivationCard,
        session: &Session,
    ) -> Result<ActivationCard, CardError> {
        Self::add_selection(host, card, &session.targeted, Selection::Targeted)
    }

    fn add_selection<P: Persistence + ?Sized>(
        host: &mut P,
        card: &ActivationCard,
        new_targets: &[TargetId],
        selection: Selection,
    ) -> Result<ActivationCard, CardError> {
        if !card.is_activation_card() {
            return Err(CardError::WrongCardType(CardAction::ManageTargets));
        }
        if new_targets.is_empty() {
            return Err(CardError::EmptySelection(selection));
        }

        let targets = union_targets(card.targets.iter(), new_targets);
        debug!(card = %card.id, count = targets.len(), "persisting card targets");
        Ok(host.update_card(&card.id, CardPatch::targets(targets))?)
    }

    /// Remove a target and its defend choice, then persist both.
    ///
    /// The target id is treated as a dot path into the defend choices: only
    /// the leaf entry is deleted, siblings and ancestors stay.
    pub fn remove_target<P: Persistence + ?Sized>(
        host: &mut P,
        card: &ActivationCard,
        target: &TargetId,
    ) -> Result<ActivationCard, CardError> {
        if !card.is_activation_card() {
            return Err(CardError::WrongCardType(CardAction::ManageTargets));
        }

        let targets: Vec<TargetId> = card.targets.iter().filter(|t| *t != target).cloned().collect();
        let mut choices = card.defend_choices.clone();
        path::delete_leaf(&mut choices, target.as_str());

        let patch = CardPatch::targets(targets).with_defend_choices(choices);
        Ok(host.update_card(&card.id, patch)?)
    }

    /// Composite target id of a participant's token, if it has one.
    #[must_use]
    pub fn combatant_target_id(combatant: &CombatantRecord) -> Option<TargetId> {
        combatant.target_id()
    }
}

fn union_targets<'a>(
    existing: impl Iterator<Item = &'a TargetId>,
    new_targets: &'a [TargetId],
) -> Vec<TargetId> {
    let mut seen: FxHashSet<&TargetId> = FxHashSet::default();
    existing
        .chain(new_targets.iter())
        .filter(|target| seen.insert(*target))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(token: &str) -> TargetId {
        TargetId::new(format!("Scene.s.Token.{token}"))
    }

    #[test]
    fn test_union_keeps_order() {
        let existing = [target("b"), target("a")];
        let merged = union_targets(existing.iter(), &[target("a"), target("c"), target("c")]);
        assert_eq!(merged, vec![target("b"), target("a"), target("c")]);
    }

    #[test]
    fn test_union_of_nothing() {
        assert!(union_targets(std::iter::empty(), &[]).is_empty());
    }
}
