//! UI-facing activation card handle.
//!
//! `ReactiveCard` bundles a card snapshot, its change subscription, and the
//! card operations. Reads are plain; writes go through the host and report
//! failures as user notifications instead of errors, so a UI action never
//! has to handle one.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use card_sync::card::{ActivationCard, CardKind, ReactiveCard};
//! use card_sync::core::SyncConfig;
//! use card_sync::events::ChangeHub;
//! use card_sync::host::MemoryWorld;
//!
//! let hub = ChangeHub::new();
//! let mut world = MemoryWorld::new();
//! let card = ActivationCard::new("m1", CardKind::Spell);
//! world.add_card(card.clone());
//!
//! let handle = ReactiveCard::new(card, &hub, SyncConfig::default());
//! let stale = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&stale);
//! let view = handle.reactive(move || flag.set(true));
//!
//! let target = world.place_token("s", "t", None);
//! view.add_targets(&mut world, &[target]);
//! world.publish(&hub);
//!
//! assert!(stale.get());
//! assert_eq!(view.snapshot().targets.len(), 1);
//! ```

use std::cell::RefCell;
use std::ops::Deref;
use std::rc::Rc;

use tracing::warn;

use crate::core::{CardError, MessageId, Session, Severity, SyncConfig, TargetId};
use crate::damage::{DamageReport, DamageResolver};
use crate::defend::DefendCoordinator;
use crate::effects::{ContextTraversal, EffectNode, EffectSelector, NodeTraversal};
use crate::events::ChangeHub;
use crate::host::{DamageOptions, Documents, Host, Notifier, Permissions};
use crate::targets::TargetRegistry;

use super::activation::{ActivationCard, DefendChoice};
use super::subscription::{CardSubscription, Observer, SharedCard};

/// An activation card with reactive invalidation and card operations.
pub struct ReactiveCard {
    card: SharedCard,
    subscription: CardSubscription,
    config: SyncConfig,
}

impl ReactiveCard {
    /// Wrap a card snapshot. Listeners register on first observation.
    pub fn new(card: ActivationCard, hub: &ChangeHub, config: SyncConfig) -> Self {
        let card = Rc::new(RefCell::new(card));
        let subscription = CardSubscription::new(hub, Rc::clone(&card));
        Self {
            card,
            subscription,
            config,
        }
    }

    /// Arm invalidation for an observer and return a view for chained reads.
    ///
    /// The observer stays attached for as long as the view (or the observer
    /// taken out of it) is alive.
    pub fn reactive(&self, on_invalidate: impl Fn() + 'static) -> Tracked<'_> {
        Tracked {
            card: self,
            observer: self.subscription.subscribe(on_invalidate),
        }
    }

    /// The underlying subscription.
    #[must_use]
    pub fn subscription(&self) -> &CardSubscription {
        &self.subscription
    }

    /// Current card snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ActivationCard {
        self.card.borrow().clone()
    }

    /// Card id.
    #[must_use]
    pub fn id(&self) -> MessageId {
        self.card.borrow().id.clone()
    }

    /// Whether the card carries activation semantics.
    #[must_use]
    pub fn is_activation_card(&self) -> bool {
        self.card.borrow().is_activation_card()
    }

    // === Derived reads ===

    /// Effect display groups using the stock traversal.
    #[must_use]
    pub fn effect_nodes(&self) -> Vec<Vec<EffectNode>> {
        self.effect_nodes_with(&ContextTraversal)
    }

    /// Effect display groups using a custom traversal.
    #[must_use]
    pub fn effect_nodes_with<T: NodeTraversal>(&self, traversal: &T) -> Vec<Vec<EffectNode>> {
        EffectSelector::new(traversal, &self.config).select(&self.card.borrow())
    }

    /// Whether the target may currently defend.
    pub fn can_target_defend<D: Documents + ?Sized>(&self, docs: &D, target: &TargetId) -> bool {
        DefendCoordinator::is_defend_eligible(docs, &self.card.borrow(), target)
    }

    /// Whether the session's user may choose Defend for the target.
    pub fn can_user_set_defend_choice<H: Documents + Permissions + ?Sized>(
        &self,
        host: &H,
        session: &Session,
        target: &TargetId,
    ) -> bool {
        DefendCoordinator::can_set_defend_choice(host, &self.card.borrow(), session, target)
    }

    /// Stored defend choice, `None` when undecided.
    #[must_use]
    pub fn get_defend_choice(&self, target: &TargetId) -> Option<DefendChoice> {
        DefendCoordinator::get_defend_choice(&self.card.borrow(), target)
    }

    // === Operations ===

    /// Add explicit target ids.
    pub fn add_targets<H: Host + ?Sized>(
        &self,
        host: &mut H,
        targets: &[TargetId],
    ) -> Option<ActivationCard> {
        let card = self.snapshot();
        let result = TargetRegistry::add_targets(host, &card, targets);
        self.settle_card(host, result)
    }

    /// Add the tokens the session controls.
    pub fn add_selected_tokens_as_targets<H: Host + ?Sized>(
        &self,
        host: &mut H,
        session: &Session,
    ) -> Option<ActivationCard> {
        let card = self.snapshot();
        let result = TargetRegistry::add_controlled(host, &card, session);
        self.settle_card(host, result)
    }

    /// Add the tokens the session targets.
    pub fn add_targeted_tokens_as_targets<H: Host + ?Sized>(
        &self,
        host: &mut H,
        session: &Session,
    ) -> Option<ActivationCard> {
        let card = self.snapshot();
        let result = TargetRegistry::add_targeted(host, &card, session);
        self.settle_card(host, result)
    }

    /// Remove a target and its defend choice.
    pub fn remove_target<H: Host + ?Sized>(
        &self,
        host: &mut H,
        target: &TargetId,
    ) -> Option<ActivationCard> {
        let card = self.snapshot();
        let result = TargetRegistry::remove_target(host, &card, target);
        self.settle_card(host, result)
    }

    /// Record a defend choice for a target.
    pub fn set_defend_choice<H: Host + ?Sized>(
        &self,
        host: &mut H,
        session: &Session,
        target: &TargetId,
        choice: DefendChoice,
    ) -> Option<ActivationCard> {
        let card = self.snapshot();
        let result = DefendCoordinator::set_defend_choice(host, &card, session, target, choice);
        self.settle_card(host, result)
    }

    /// Apply damage to every target.
    pub fn apply_damage<H: Host + ?Sized>(
        &self,
        host: &mut H,
        session: &Session,
        amount: i64,
        options: &DamageOptions,
    ) -> Option<DamageReport> {
        let card = self.snapshot();
        let result = DamageResolver::apply_damage(host, &card, session, amount, options);
        settle(host, &card.id, result)
    }

    fn settle_card<N: Notifier + ?Sized>(
        &self,
        notifier: &mut N,
        result: Result<ActivationCard, CardError>,
    ) -> Option<ActivationCard> {
        let id = self.id();
        let updated = settle(notifier, &id, result)?;
        *self.card.borrow_mut() = updated.clone();
        Some(updated)
    }
}

fn settle<T, N: Notifier + ?Sized>(
    notifier: &mut N,
    card: &MessageId,
    result: Result<T, CardError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%card, %err, "card operation rejected");
            let message = err.to_string();
            match err.severity() {
                Severity::Warning => notifier.warn(&message),
                Severity::Error => notifier.error(&message),
            }
            None
        }
    }
}

/// A card view with an attached observer.
pub struct Tracked<'a> {
    card: &'a ReactiveCard,
    observer: Observer,
}

impl Tracked<'_> {
    /// Keep the observer while releasing the borrow of the card.
    #[must_use]
    pub fn into_observer(self) -> Observer {
        self.observer
    }
}

impl Deref for Tracked<'_> {
    type Target = ReactiveCard;

    fn deref(&self) -> &ReactiveCard {
        self.card
    }
}
