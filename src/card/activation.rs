//! Activation card data.
//!
//! An activation card is the chat-log record of one attack, spell, or
//! feature use. Only the `feature`, `object`, and `spell` subtypes carry
//! activation semantics; every other subtype is inert and every card
//! operation rejects or ignores it uniformly.

use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{path, MessageId, TargetId, UserId};
use crate::effects::EffectNode;

/// Chat message subtype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardKind {
    /// Plain chat message without activation semantics.
    #[default]
    Base,
    /// Class or monster feature use.
    Feature,
    /// Item use.
    Object,
    /// Spell cast.
    Spell,
}

impl CardKind {
    /// Subtypes that carry targets, outcomes, and effects.
    pub const ACTIVATION: [CardKind; 3] = [CardKind::Feature, CardKind::Object, CardKind::Spell];

    /// Whether this subtype has activation semantics.
    #[must_use]
    pub const fn is_activation(self) -> bool {
        matches!(self, CardKind::Feature | CardKind::Object | CardKind::Spell)
    }
}

/// Attack outcome recorded on the card. Exactly one holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    CriticalHit,
    #[default]
    Hit,
    Miss,
}

/// A target's decision to spend Defend against this card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefendChoice {
    Yes,
    No,
}

impl DefendChoice {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DefendChoice::Yes => "yes",
            DefendChoice::No => "no",
        }
    }

    /// Parse a stored value. Anything but `"yes"` / `"no"` is undecided.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "yes" => Some(DefendChoice::Yes),
            "no" => Some(DefendChoice::No),
            _ => None,
        }
    }

    /// JSON form for storage.
    #[must_use]
    pub fn to_value(self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

/// An activation card snapshot.
///
/// Targets use a persistent vector so snapshots handed to observers are
/// cheap to clone. Defend choices are a nested JSON object keyed by target
/// id path (see [`crate::core::path`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivationCard {
    /// Message identifier.
    pub id: MessageId,

    /// Message subtype.
    pub kind: CardKind,

    /// User who created the message.
    pub author: Option<UserId>,

    /// Target ids in insertion order, without duplicates.
    #[serde(default)]
    pub targets: Vector<TargetId>,

    /// Hit, miss, or critical hit.
    #[serde(default)]
    pub outcome: Outcome,

    /// Per-target defend decisions. Absent means undecided.
    #[serde(default)]
    pub defend_choices: Map<String, Value>,

    /// Effect tree of the activation.
    #[serde(default)]
    pub effects: Vec<EffectNode>,
}

impl ActivationCard {
    /// Create an empty card of the given kind.
    pub fn new(id: impl Into<String>, kind: CardKind) -> Self {
        Self {
            id: MessageId::new(id),
            kind,
            author: None,
            targets: Vector::new(),
            outcome: Outcome::default(),
            defend_choices: Map::new(),
            effects: Vec::new(),
        }
    }

    /// Set the author (builder pattern).
    #[must_use]
    pub fn with_author(mut self, author: UserId) -> Self {
        self.author = Some(author);
        self
    }

    /// Set the outcome (builder pattern).
    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Add a target if not already present (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: TargetId) -> Self {
        if !self.targets.contains(&target) {
            self.targets.push_back(target);
        }
        self
    }

    /// Store a defend choice (builder pattern).
    #[must_use]
    pub fn with_defend_choice(mut self, target: &TargetId, choice: DefendChoice) -> Self {
        path::set_path(&mut self.defend_choices, target.as_str(), choice.to_value());
        self
    }

    /// Set the effect tree (builder pattern).
    #[must_use]
    pub fn with_effects(mut self, effects: Vec<EffectNode>) -> Self {
        self.effects = effects;
        self
    }

    /// Whether this card carries activation semantics.
    #[must_use]
    pub fn is_activation_card(&self) -> bool {
        self.kind.is_activation()
    }

    /// Whether `target` is one of this card's targets.
    #[must_use]
    pub fn has_target(&self, target: &TargetId) -> bool {
        self.targets.contains(target)
    }

    /// Stored defend choice for `target`, or `None` when undecided.
    ///
    /// Always `None` for inert cards.
    #[must_use]
    pub fn defend_choice(&self, target: &TargetId) -> Option<DefendChoice> {
        if !self.is_activation_card() {
            return None;
        }
        path::get_path(&self.defend_choices, target.as_str()).and_then(DefendChoice::from_value)
    }

    /// Apply a persisted patch to this snapshot.
    pub fn apply_patch(&mut self, patch: &CardPatch) {
        if let Some(targets) = &patch.targets {
            self.targets = targets.iter().cloned().collect();
        }
        if let Some(choices) = &patch.defend_choices {
            self.defend_choices = choices.clone();
        }
    }
}

/// Partial update of a card's activation data.
///
/// Each present field replaces the stored field wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defend_choices: Option<Map<String, Value>>,
}

impl CardPatch {
    /// Replace the target list.
    #[must_use]
    pub fn targets(targets: Vec<TargetId>) -> Self {
        Self {
            targets: Some(targets),
            defend_choices: None,
        }
    }

    /// Replace the defend-choice mapping.
    #[must_use]
    pub fn defend_choices(choices: Map<String, Value>) -> Self {
        Self {
            targets: None,
            defend_choices: Some(choices),
        }
    }

    /// Also replace the defend-choice mapping (builder pattern).
    #[must_use]
    pub fn with_defend_choices(mut self, choices: Map<String, Value>) -> Self {
        self.defend_choices = Some(choices);
        self
    }

    /// JSON delta describing this patch, as carried by change events.
    #[must_use]
    pub fn to_delta(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target(token: &str) -> TargetId {
        TargetId::new(format!("Scene.s1.Token.{token}"))
    }

    #[test]
    fn test_activation_kinds() {
        for kind in CardKind::ACTIVATION {
            assert!(kind.is_activation());
        }
        assert!(!CardKind::Base.is_activation());
    }

    #[test]
    fn test_with_target_dedupes() {
        let card = ActivationCard::new("m1", CardKind::Spell)
            .with_target(target("a"))
            .with_target(target("b"))
            .with_target(target("a"));
        assert_eq!(card.targets.len(), 2);
        assert_eq!(card.targets[0], target("a"));
    }

    #[test]
    fn test_defend_choice_reads() {
        let card = ActivationCard::new("m1", CardKind::Feature)
            .with_target(target("a"))
            .with_defend_choice(&target("a"), DefendChoice::Yes);

        assert_eq!(card.defend_choice(&target("a")), Some(DefendChoice::Yes));
        assert_eq!(card.defend_choice(&target("b")), None);
    }

    #[test]
    fn test_defend_choice_inert_card() {
        let card = ActivationCard::new("m1", CardKind::Base)
            .with_defend_choice(&target("a"), DefendChoice::Yes);
        assert_eq!(card.defend_choice(&target("a")), None);
    }

    #[test]
    fn test_malformed_choice_is_undecided() {
        let mut card = ActivationCard::new("m1", CardKind::Object);
        card.defend_choices.insert("Scene.s1.Token.a".into(), json!("maybe"));
        assert_eq!(card.defend_choice(&target("a")), None);
    }

    #[test]
    fn test_apply_patch() {
        let mut card = ActivationCard::new("m1", CardKind::Spell).with_target(target("a"));
        let patch = CardPatch::targets(vec![target("b"), target("c")]);
        card.apply_patch(&patch);
        assert_eq!(card.targets.len(), 2);
        assert!(card.has_target(&target("c")));
        assert!(!card.has_target(&target("a")));
    }

    #[test]
    fn test_patch_delta() {
        let patch = CardPatch::targets(vec![target("a")]);
        assert_eq!(patch.to_delta(), json!({ "targets": ["Scene.s1.Token.a"] }));
    }
}
