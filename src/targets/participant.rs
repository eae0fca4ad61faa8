//! Target resolution: composite id to token, actor, and participant.
//!
//! A target that does not resolve to a token placement with an actor is
//! not a valid target. Lookups return `None` for it and batch operations
//! skip it without error.

use rustc_hash::FxHashSet;

use crate::core::{CombatId, TargetId};
use crate::host::{ActorRecord, CombatRecord, CombatantRecord, Documents, TokenRecord};

/// A participant together with the combat it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    pub combat: CombatId,
    pub combatant: CombatantRecord,
}

/// Resolve a target id to its token placement.
///
/// `None` unless the id is a well-formed `Scene.<id>.Token.<id>` that the
/// host knows about and the placement represents an actor.
pub fn resolve_token<D: Documents + ?Sized>(docs: &D, target: &TargetId) -> Option<TokenRecord> {
    target.parts()?;
    let token = docs.resolve_token(target)?;
    token.actor.as_ref()?;
    Some(token)
}

/// Resolve a target id to its token placement and actor.
pub fn resolve_actor<D: Documents + ?Sized>(
    docs: &D,
    target: &TargetId,
) -> Option<(TokenRecord, ActorRecord)> {
    let token = resolve_token(docs, target)?;
    let actor = docs.actor(token.actor.as_ref()?)?;
    Some((token, actor))
}

/// Find the participant record for a token placement.
///
/// A cached link on the token wins. Otherwise combats are searched in
/// priority order: the active combat, the viewed combat, then every other
/// combat in collection order, each combat visited once. A combat scoped to
/// another scene is skipped. The first participant with the token's id (and
/// the token's scene, when the participant records one) is returned.
pub fn find_participant<D: Documents + ?Sized>(
    docs: &D,
    token: &TokenRecord,
) -> Option<Participant> {
    if let Some(link) = &token.combatant {
        let linked = docs.combat(&link.combat).and_then(|combat| {
            combat.combatant(&link.combatant).cloned().map(|combatant| Participant {
                combat: combat.id.clone(),
                combatant,
            })
        });
        if linked.is_some() {
            return linked;
        }
    }

    let all = docs.combats();
    let priority = [docs.active_combat(), docs.viewed_combat()];
    let preferred = priority
        .iter()
        .flatten()
        .filter_map(|id| all.iter().find(|combat| &combat.id == id));

    let mut visited: FxHashSet<&CombatId> = FxHashSet::default();
    for combat in preferred.chain(all.iter()) {
        if !visited.insert(&combat.id) {
            continue;
        }
        if let Some(combatant) = match_in_combat(combat, token) {
            return Some(Participant {
                combat: combat.id.clone(),
                combatant: combatant.clone(),
            });
        }
    }

    None
}

fn match_in_combat<'a>(combat: &'a CombatRecord, token: &TokenRecord) -> Option<&'a CombatantRecord> {
    if combat.scene.as_ref().is_some_and(|scene| scene != &token.scene) {
        return None;
    }
    combat.combatants.iter().find(|combatant| {
        combatant.token.as_ref() == Some(&token.token)
            && combatant
                .scene
                .as_ref()
                .map_or(true, |scene| scene == &token.scene)
    })
}
