//! Reactive invalidation for activation cards.
//!
//! A [`CardSubscription`] lets any number of observers learn that a card's
//! displayed state may be stale. Four hub listeners back it:
//!
//! - actor updated: the actor has a token among the card's targets
//! - card updated: the updated card is this card
//! - combatant updated: the participant's token is among the card's targets
//! - user updated: the user is the card's author
//!
//! Changes written with `diff: false` are ignored by all four. The listeners
//! are registered when the first observer attaches and all removed together
//! when the last one detaches.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::events::{ChangeEvent, ChangeHub, ChangeKind, ListenerId};

use super::activation::ActivationCard;

/// A card snapshot shared between a facade and its listeners.
pub type SharedCard = Rc<RefCell<ActivationCard>>;

const WATCHED: [ChangeKind; 4] = [
    ChangeKind::ActorUpdated,
    ChangeKind::CardUpdated,
    ChangeKind::CombatantUpdated,
    ChangeKind::UserUpdated,
];

/// Whether a change may make the card's displayed state stale.
#[must_use]
pub fn invalidates(card: &ActivationCard, event: &ChangeEvent) -> bool {
    if !event.is_diff() {
        return false;
    }
    match event {
        ChangeEvent::ActorUpdated { actor, .. } => {
            card.is_activation_card()
                && actor.dependent_tokens.iter().any(|token| card.has_target(token))
        }
        ChangeEvent::CardUpdated { card: updated, .. } => updated.id == card.id,
        ChangeEvent::CombatantUpdated { combatant, .. } => {
            card.is_activation_card()
                && combatant
                    .target_id()
                    .is_some_and(|target| card.has_target(&target))
        }
        ChangeEvent::UserUpdated { user, .. } => card.author.as_ref() == Some(&user.id),
        ChangeEvent::CombatantCreated { .. } => false,
    }
}

type Callback = Rc<dyn Fn()>;

#[derive(Default)]
struct ObserverSet {
    observers: Vec<(u64, Callback)>,
    next_id: u64,
    listeners: Vec<(ChangeKind, ListenerId)>,
}

impl ObserverSet {
    fn callbacks(&self) -> Vec<Callback> {
        self.observers.iter().map(|(_, cb)| Rc::clone(cb)).collect()
    }
}

/// Lazily registered, observer-counted change subscription for one card.
pub struct CardSubscription {
    hub: ChangeHub,
    card: SharedCard,
    state: Rc<RefCell<ObserverSet>>,
}

impl CardSubscription {
    /// Create a subscription. Nothing is registered until [`subscribe`].
    ///
    /// [`subscribe`]: CardSubscription::subscribe
    pub fn new(hub: &ChangeHub, card: SharedCard) -> Self {
        Self {
            hub: hub.clone(),
            card,
            state: Rc::new(RefCell::new(ObserverSet::default())),
        }
    }

    /// Attach an observer, registering the hub listeners if it is the first.
    ///
    /// The returned [`Observer`] detaches when disposed or dropped.
    pub fn subscribe(&self, on_invalidate: impl Fn() + 'static) -> Observer {
        let (id, first) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.observers.push((id, Rc::new(on_invalidate)));
            (id, state.listeners.is_empty())
        };
        if first {
            let listeners = self.register_listeners();
            self.state.borrow_mut().listeners = listeners;
        }

        Observer {
            id,
            hub: self.hub.clone(),
            state: Rc::downgrade(&self.state),
            attached: true,
        }
    }

    /// Number of attached observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Whether the hub listeners are currently registered.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        !self.state.borrow().listeners.is_empty()
    }

    fn register_listeners(&self) -> Vec<(ChangeKind, ListenerId)> {
        WATCHED
            .into_iter()
            .map(|kind| {
                let card = Rc::downgrade(&self.card);
                let state = Rc::downgrade(&self.state);
                let id = self.hub.on(kind, move |event| on_change(&card, &state, event));
                (kind, id)
            })
            .collect()
    }
}

impl Drop for CardSubscription {
    fn drop(&mut self) {
        let listeners = std::mem::take(&mut self.state.borrow_mut().listeners);
        for (kind, id) in listeners {
            self.hub.off(kind, id);
        }
    }
}

fn on_change(
    card: &Weak<RefCell<ActivationCard>>,
    state: &Weak<RefCell<ObserverSet>>,
    event: &ChangeEvent,
) {
    let (Some(card), Some(state)) = (card.upgrade(), state.upgrade()) else {
        return;
    };

    let relevant = invalidates(&card.borrow(), event);
    if !relevant {
        return;
    }
    if let ChangeEvent::CardUpdated { card: updated, .. } = event {
        *card.borrow_mut() = updated.clone();
    }

    let callbacks = state.borrow().callbacks();
    for callback in callbacks {
        callback();
    }
}

/// One attached observer. Detaches on [`Observer::dispose`] or drop.
pub struct Observer {
    id: u64,
    hub: ChangeHub,
    state: Weak<RefCell<ObserverSet>>,
    attached: bool,
}

impl Observer {
    /// Detach this observer.
    pub fn dispose(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;

        let Some(state) = self.state.upgrade() else {
            return;
        };
        let released = {
            let mut set = state.borrow_mut();
            set.observers.retain(|(id, _)| *id != self.id);
            if set.observers.is_empty() {
                std::mem::take(&mut set.listeners)
            } else {
                Vec::new()
            }
        };
        for (kind, id) in released {
            self.hub.off(kind, id);
        }
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardKind;
    use crate::core::{CombatId, SceneId, TargetId, TokenId, UserId, UserRecord};
    use crate::events::ChangeOptions;
    use crate::host::{ActorRecord, CombatantRecord, CreatureKind};
    use serde_json::json;

    fn card() -> ActivationCard {
        ActivationCard::new("m1", CardKind::Spell)
            .with_author(UserId::new("author"))
            .with_target(TargetId::new("Scene.s.Token.t"))
    }

    fn actor_event(tokens: &[&str], options: ChangeOptions) -> ChangeEvent {
        let mut actor = ActorRecord::new("a", CreatureKind::Npc, 3.0);
        actor.dependent_tokens = tokens.iter().map(|t| TargetId::new(*t)).collect();
        ChangeEvent::ActorUpdated {
            actor,
            delta: json!({}),
            options,
        }
    }

    #[test]
    fn test_actor_relevance() {
        let card = card();
        assert!(invalidates(&card, &actor_event(&["Scene.s.Token.t"], ChangeOptions::default())));
        assert!(!invalidates(&card, &actor_event(&["Scene.s.Token.x"], ChangeOptions::default())));
        assert!(!invalidates(&card, &actor_event(&["Scene.s.Token.t"], ChangeOptions::silent())));

        let mut inert = card.clone();
        inert.kind = CardKind::Base;
        assert!(!invalidates(&inert, &actor_event(&["Scene.s.Token.t"], ChangeOptions::default())));
    }

    #[test]
    fn test_combatant_relevance() {
        let card = card();
        let event = |token: &str| ChangeEvent::CombatantUpdated {
            combat: CombatId::new("cb"),
            combatant: CombatantRecord::new(
                "c",
                CreatureKind::Npc,
                &crate::core::ActorId::new("a"),
                &SceneId::new("s"),
                &TokenId::new(token),
            ),
            delta: json!({}),
            options: ChangeOptions::default(),
        };
        assert!(invalidates(&card, &event("t")));
        assert!(!invalidates(&card, &event("other")));
    }

    #[test]
    fn test_user_and_card_relevance() {
        let card = card();
        let user = |id: &str| ChangeEvent::UserUpdated {
            user: UserRecord::player(id),
            delta: json!({}),
            options: ChangeOptions::default(),
        };
        assert!(invalidates(&card, &user("author")));
        assert!(!invalidates(&card, &user("someone")));

        let updated = |id: &str| ChangeEvent::CardUpdated {
            card: ActivationCard::new(id, CardKind::Base),
            delta: json!({}),
            options: ChangeOptions::default(),
        };
        assert!(invalidates(&card, &updated("m1")));
        assert!(!invalidates(&card, &updated("m2")));
    }

    #[test]
    fn test_lazy_registration_and_teardown() {
        let hub = ChangeHub::new();
        let shared = Rc::new(RefCell::new(card()));
        let subscription = CardSubscription::new(&hub, shared);
        assert!(hub.is_empty());
        assert!(!subscription.is_armed());

        let first = subscription.subscribe(|| {});
        let second = subscription.subscribe(|| {});
        assert_eq!(hub.len(), 4);
        assert_eq!(subscription.observer_count(), 2);

        first.dispose();
        assert_eq!(hub.len(), 4);
        drop(second);
        assert!(hub.is_empty());
        assert!(!subscription.is_armed());

        let _again = subscription.subscribe(|| {});
        assert_eq!(hub.len(), 4);
    }
}
