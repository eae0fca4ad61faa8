//! Defend choices on activation cards.
//!
//! A player character may spend a one-time Defend reaction to let armor
//! mitigate the card's damage. Each target's decision is stored on the card
//! until damage is applied; after that the entry is moot but kept.

use tracing::{debug, warn};

use crate::card::{ActivationCard, CardPatch, DefendChoice};
use crate::core::{path, CardAction, CardError, Denied, Session, TargetId};
use crate::host::{Documents, Operation, PermissionLevel, Permissions, Persistence};
use crate::targets::{find_participant, resolve_actor};

/// Eligibility, authorization, and storage of defend choices.
pub struct DefendCoordinator;

impl DefendCoordinator {
    /// Whether the target may currently defend.
    ///
    /// The target must be a player character with a participant record
    /// whose Defend reaction is unspent.
    pub fn is_defend_eligible<D: Documents + ?Sized>(
        docs: &D,
        card: &ActivationCard,
        target: &TargetId,
    ) -> bool {
        if !card.is_activation_card() {
            return false;
        }
        let Some((token, actor)) = resolve_actor(docs, target) else {
            return false;
        };
        if !actor.kind.is_player() {
            return false;
        }
        find_participant(docs, &token).is_some_and(|p| p.combatant.defend_available)
    }

    /// Whether the session's user may record a defend choice for the target.
    ///
    /// Game masters always may. Anyone else needs update permission on the
    /// card and ownership of the target's actor, which must be a player
    /// character.
    pub fn can_set_defend_choice<H: Documents + Permissions + ?Sized>(
        host: &H,
        card: &ActivationCard,
        session: &Session,
        target: &TargetId,
    ) -> bool {
        if !card.is_activation_card() {
            return false;
        }
        if session.is_gm() {
            return true;
        }
        if !host.can_user_modify(&session.user, card, Operation::Update) {
            return false;
        }
        let Some((_, actor)) = resolve_actor(host, target) else {
            return false;
        };
        if !actor.kind.is_player() {
            return false;
        }
        host.test_user_permission(&session.user, &actor, PermissionLevel::Owner)
    }

    /// Stored choice for the target, `None` when undecided or inert.
    #[must_use]
    pub fn get_defend_choice(card: &ActivationCard, target: &TargetId) -> Option<DefendChoice> {
        card.defend_choice(target)
    }

    /// Record a defend choice and persist the whole choice mapping.
    ///
    /// The mapping is deep-copied, updated at the target's path, and written
    /// back wholesale so nested paths are never partially written.
    pub fn set_defend_choice<H: Documents + Permissions + Persistence + ?Sized>(
        host: &mut H,
        card: &ActivationCard,
        session: &Session,
        target: &TargetId,
        choice: DefendChoice,
    ) -> Result<ActivationCard, CardError> {
        if !card.is_activation_card() {
            return Err(CardError::WrongCardType(CardAction::SetDefend));
        }
        if !Self::is_defend_eligible(&*host, card, target) {
            debug!(card = %card.id, %target, "defend not available");
            return Err(CardError::DefendUnavailable);
        }
        if !Self::can_set_defend_choice(&*host, card, session, target) {
            warn!(card = %card.id, %target, user = %session.user.id, "defend choice denied");
            return Err(CardError::PermissionDenied(Denied::DefendChoice));
        }

        let mut choices = card.defend_choices.clone();
        path::set_path(&mut choices, target.as_str(), choice.to_value());
        Ok(host.update_card(&card.id, CardPatch::defend_choices(choices))?)
    }
}
