//! Reactive invalidation tests.
//!
//! Changes are written to the in-memory host and published to a hub; the
//! tests count how often card observers are told to refresh.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use card_sync::card::{ReactiveCard, Tracked};
use card_sync::core::{CombatId, SyncConfig, UserRecord};
use card_sync::events::{ChangeHub, ChangeOptions};
use card_sync::host::{CombatantPatch, DamageOptions, Persistence};
use card_sync::targets::TargetRegistry;

use common::{gm, store, table, Table};

fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
    let count = Rc::new(Cell::new(0));
    let handle = Rc::clone(&count);
    (count, move || handle.set(handle.get() + 1))
}

fn targeting_orc(t: &mut Table, hub: &ChangeHub) -> ReactiveCard {
    let card = t.card.clone().with_target(t.orc.clone());
    let card = store(t, card);
    ReactiveCard::new(card, hub, SyncConfig::default())
}

fn watch(card: &ReactiveCard) -> (Rc<Cell<u32>>, Tracked<'_>) {
    let (count, on_invalidate) = counter();
    (count, card.reactive(on_invalidate))
}

#[test]
fn test_listeners_register_lazily() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    assert!(hub.is_empty());

    let (_, view) = watch(&card);
    assert_eq!(hub.len(), 4);
    assert!(card.subscription().is_armed());

    drop(view);
    assert!(hub.is_empty());
}

#[test]
fn test_target_health_change_invalidates() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (count, _view) = watch(&card);

    t.world.set_hp("hero", Some(5.0));
    t.world.publish(&hub);
    assert_eq!(count.get(), 0, "hero is not targeted");

    t.world.set_hp("orc", Some(5.0));
    t.world.publish(&hub);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_silent_changes_are_ignored() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (count, _view) = watch(&card);

    t.world.touch_actor("orc", ChangeOptions::silent());
    t.world.touch_user(UserRecord::player("alice"), ChangeOptions::silent());
    t.world.publish(&hub);
    assert_eq!(count.get(), 0);

    t.world.touch_actor("orc", ChangeOptions::default());
    t.world.publish(&hub);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_participant_change_invalidates() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (count, _view) = watch(&card);

    let cb1 = CombatId::new("cb1");
    t.world
        .update_combatant(&cb1, CombatantPatch::new("c-hero".into()).defeated(true))
        .expect("patch hero");
    t.world.publish(&hub);
    assert_eq!(count.get(), 0);

    t.world
        .update_combatant(&cb1, CombatantPatch::new("c-orc".into()).actions_base(1))
        .expect("patch orc");
    t.world.publish(&hub);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_author_change_invalidates() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (count, _view) = watch(&card);

    t.world.touch_user(UserRecord::player("bob"), ChangeOptions::default());
    t.world.publish(&hub);
    assert_eq!(count.get(), 0);

    t.world.touch_user(UserRecord::player("alice"), ChangeOptions::default());
    t.world.publish(&hub);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_external_card_update_refreshes_snapshot() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (count, view) = watch(&card);

    // another client adds a target through the host directly
    let stored = t.card.clone();
    TargetRegistry::add_targets(&mut t.world, &stored, &[t.hero.clone()]).expect("add");
    assert_eq!(view.snapshot().targets.len(), 1);

    t.world.publish(&hub);
    assert_eq!(count.get(), 1);
    assert!(view.snapshot().has_target(&t.hero));

    // the refreshed snapshot now tracks the new target
    t.world.set_hp("hero", Some(1.0));
    t.world.publish(&hub);
    assert_eq!(count.get(), 2);
}

#[test]
fn test_other_card_update_is_ignored() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (count, _view) = watch(&card);

    let other = card_sync::card::ActivationCard::new("m2", card_sync::card::CardKind::Spell);
    t.world.add_card(other.clone());
    TargetRegistry::add_targets(&mut t.world, &other, &[t.orc.clone()]).expect("add");
    t.world.publish(&hub);
    assert_eq!(count.get(), 0);
}

#[test]
fn test_every_observer_is_notified() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (first, first_view) = watch(&card);
    let (second, second_view) = watch(&card);
    assert_eq!(card.subscription().observer_count(), 2);
    assert_eq!(hub.len(), 4);

    t.world.set_hp("orc", Some(2.0));
    t.world.publish(&hub);
    assert_eq!((first.get(), second.get()), (1, 1));

    drop(first_view);
    assert_eq!(hub.len(), 4, "one observer remains");
    t.world.set_hp("orc", Some(1.0));
    t.world.publish(&hub);
    assert_eq!((first.get(), second.get()), (1, 2));

    drop(second_view);
    assert!(hub.is_empty());
}

#[test]
fn test_observer_outlives_view_and_card() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (count, view) = watch(&card);
    let observer = view.into_observer();

    t.world.set_hp("orc", Some(2.0));
    t.world.publish(&hub);
    assert_eq!(count.get(), 1);

    drop(card);
    assert!(hub.is_empty());
    observer.dispose();
}

#[test]
fn test_own_writes_invalidate_after_publish() {
    let mut t = table();
    let hub = ChangeHub::new();
    let card = targeting_orc(&mut t, &hub);
    let (count, view) = watch(&card);

    view.apply_damage(&mut t.world, &gm(), 3, &DamageOptions::new())
        .expect("damage applied");
    assert_eq!(count.get(), 0, "nothing is delivered until published");

    t.world.publish(&hub);
    assert_eq!(count.get(), 1);
}
