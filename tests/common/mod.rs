//! Shared table fixture for integration tests.
//!
//! One scene `s1` with a player character, an NPC, and a minion, all in the
//! started combat `cb1` (round 1, NPC holding the turn).

#![allow(dead_code)]

use card_sync::card::{ActivationCard, CardKind};
use card_sync::core::{ActorId, SceneId, Session, TargetId, TokenId, UserId, UserRecord};
use card_sync::host::{ActorRecord, CombatRecord, CombatantRecord, CreatureKind, MemoryWorld};

pub struct Table {
    pub world: MemoryWorld,
    pub hero: TargetId,
    pub orc: TargetId,
    pub goblin: TargetId,
    pub card: ActivationCard,
}

pub fn combatant(id: &str, kind: CreatureKind, actor: &str, token: &str) -> CombatantRecord {
    CombatantRecord::new(
        id,
        kind,
        &ActorId::new(actor),
        &SceneId::new("s1"),
        &TokenId::new(token),
    )
}

pub fn table() -> Table {
    let mut world = MemoryWorld::new();
    world.add_actor(ActorRecord::new("hero", CreatureKind::Character, 20.0));
    world.add_actor(ActorRecord::new("orc", CreatureKind::Npc, 10.0));
    world.add_actor(ActorRecord::new("goblin", CreatureKind::Minion, 3.0));
    world.set_armor("hero", 4);
    world.set_armor("orc", 2);
    world.grant_owner("hero", "alice");

    let hero = world.place_token("s1", "hero", Some("hero"));
    let orc = world.place_token("s1", "orc", Some("orc"));
    let goblin = world.place_token("s1", "goblin", Some("goblin"));

    let mut combat = CombatRecord::new("cb1", Some(SceneId::new("s1")));
    combat.round = 1;
    combat.turn = Some(1);
    world.add_combat(combat);

    let mut pc = combatant("c-hero", CreatureKind::Character, "hero", "hero");
    pc.defend_available = true;
    pc.actions_base = 2;
    let mut npc = combatant("c-orc", CreatureKind::Npc, "orc", "orc");
    npc.actions_base = 2;
    world.add_combatant("cb1", pc);
    world.add_combatant("cb1", npc);
    world.add_combatant("cb1", combatant("c-goblin", CreatureKind::Minion, "goblin", "goblin"));
    world.set_active_combat(Some("cb1"));

    let card = ActivationCard::new("m1", CardKind::Spell).with_author(UserId::new("alice"));
    world.add_card(card.clone());

    world.take_events();
    world.clear_log();

    Table {
        world,
        hero,
        orc,
        goblin,
        card,
    }
}

/// Store a card in the world, replacing any card with the same id.
pub fn store(table: &mut Table, card: ActivationCard) -> ActivationCard {
    table.world.add_card(card.clone());
    table.card = card.clone();
    card
}

pub fn gm() -> Session {
    Session::new(UserRecord::gm("gm"))
}

pub fn alice() -> Session {
    Session::new(UserRecord::player("alice"))
}

pub fn bob() -> Session {
    Session::new(UserRecord::player("bob"))
}
