//! # card-sync
//!
//! Reactive synchronization between activation chat cards and the combat
//! participants they affect.
//!
//! An activation card (an attack, feature, or spell use) lists the tokens
//! it targets, records whether each player character chose to spend its
//! Defend reaction, and applies damage to every target. Independently,
//! whenever an actor's health drops to zero its non-player participants are
//! marked defeated in every combat they appear in.
//!
//! ## Design Principles
//!
//! 1. **Host-Agnostic**: The document framework is reached only through the
//!    traits in [`host`]. No document is owned here.
//!
//! 2. **Explicit Session**: The acting user and their canvas selection are
//!    passed in as a [`Session`], never read from global state.
//!
//! 3. **Sequential Writes**: Every host write is acknowledged before the
//!    next one is issued. Per-target damage and Defend consumption never
//!    interleave.
//!
//! ## Modules
//!
//! - `core`: Identifiers, session, configuration, errors, path utilities
//! - `events`: Change events and the listener hub
//! - `host`: Host collaborator traits, record snapshots, in-memory host
//! - `card`: Activation cards, change subscriptions, the reactive facade
//! - `effects`: Effect trees and outcome-driven node selection
//! - `targets`: Target resolution and target set management
//! - `defend`: Defend eligibility, authorization, and choices
//! - `damage`: Damage application
//! - `defeat`: Defeat reconciliation

pub mod core;
pub mod events;
pub mod host;
pub mod card;
pub mod effects;
pub mod targets;
pub mod defend;
pub mod damage;
pub mod defeat;

// Re-export commonly used types
pub use crate::core::{
    ActorId, CombatId, CombatantId, MessageId, SceneId, TargetId, TokenId, UserId,
    Session, UserRecord, SyncConfig,
    CardAction, CardError, Denied, HostError, Selection, Severity,
};

pub use crate::events::{ChangeEvent, ChangeHub, ChangeKind, ChangeOptions, ListenerId};

pub use crate::host::{
    ActorRecord, CombatRecord, CombatantPatch, CombatantRecord, CreatureKind, TokenRecord,
    DamageOptions, Documents, Host, Notifier, Operation, PermissionLevel, Permissions,
    Persistence, StatusToggle, MemoryWorld,
};

pub use crate::card::{
    ActivationCard, CardKind, CardPatch, DefendChoice, Outcome,
    CardSubscription, Observer, ReactiveCard, Tracked,
};

pub use crate::effects::{EffectNode, EffectSelector, ContextTraversal, NodeTraversal, OutcomeContext};

pub use crate::targets::{find_participant, Participant, TargetRegistry};

pub use crate::defend::DefendCoordinator;

pub use crate::damage::{DamageReport, DamageResolver, TargetOutcome};

pub use crate::defeat::{DefeatReconciler, DefeatReport, DefeatWatch};
