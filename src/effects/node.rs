//! Effect tree nodes.
//!
//! The effect tree is owned by the rules data of an activation: a list of
//! top-level nodes, each of which may carry child nodes keyed by the
//! outcome context they apply in (`hit`, `criticalHit`, `miss`, ...).
//! The sync layer only traverses and selects nodes; it never evaluates them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Outcome context a node applies in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeContext {
    CriticalHit,
    Hit,
    Miss,
}

impl OutcomeContext {
    /// Key used for this context in a node's `on` map.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            OutcomeContext::CriticalHit => "criticalHit",
            OutcomeContext::Hit => "hit",
            OutcomeContext::Miss => "miss",
        }
    }
}

/// Presentation style of a note node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteType {
    #[default]
    General,
    Flavor,
    Reminder,
    Warning,
}

/// What a node does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    /// Free text shown to players.
    #[serde(rename_all = "camelCase")]
    Note { note_type: NoteType, text: String },

    /// Damage roll.
    #[serde(rename_all = "camelCase")]
    Damage { formula: String, damage_type: String },

    /// Healing roll.
    Healing { formula: String },

    /// Condition applied to the target.
    Condition { condition: String },

    /// Saving throw the target must make.
    #[serde(rename_all = "camelCase")]
    SavingThrow { save_type: String, dc: Option<i64> },
}

/// One node of an effect tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectNode {
    /// Node identifier, unique within the tree.
    pub id: String,

    /// Node payload.
    #[serde(flatten)]
    pub kind: NodeKind,

    /// Context key of the parent branch this node hangs under.
    #[serde(default)]
    pub parent_context: Option<String>,

    /// Id of the parent node, `None` at the top level.
    #[serde(default)]
    pub parent_node: Option<String>,

    /// Child nodes keyed by outcome context key.
    #[serde(default, skip_serializing_if = "std::collections::HashMap::is_empty")]
    pub on: FxHashMap<String, Vec<EffectNode>>,
}

impl EffectNode {
    /// Create a top-level node.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            parent_context: None,
            parent_node: None,
            on: FxHashMap::default(),
        }
    }

    /// Create a note node.
    pub fn note(id: impl Into<String>, note_type: NoteType, text: impl Into<String>) -> Self {
        Self::new(
            id,
            NodeKind::Note {
                note_type,
                text: text.into(),
            },
        )
    }

    /// Create a damage node.
    pub fn damage(id: impl Into<String>, formula: impl Into<String>) -> Self {
        Self::new(
            id,
            NodeKind::Damage {
                formula: formula.into(),
                damage_type: "physical".to_string(),
            },
        )
    }

    /// Attach a child under an outcome context (builder pattern).
    ///
    /// The child's parent links are filled in.
    #[must_use]
    pub fn with_child(mut self, context: OutcomeContext, mut child: EffectNode) -> Self {
        child.parent_context = Some(context.key().to_string());
        child.parent_node = Some(self.id.clone());
        self.on.entry(context.key().to_string()).or_default().push(child);
        self
    }

    /// Children registered under `context`.
    #[must_use]
    pub fn children(&self, context: OutcomeContext) -> &[EffectNode] {
        self.on.get(context.key()).map_or(&[], Vec::as_slice)
    }

    /// Whether this is a top-level damage roll.
    #[must_use]
    pub fn is_base_damage(&self) -> bool {
        self.parent_node.is_none() && matches!(self.kind, NodeKind::Damage { .. })
    }

    /// Note text, if this is a note node.
    #[must_use]
    pub fn note_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Note { text, .. } => Some(text),
            _ => None,
        }
    }
}
