//! Display node selection for activation cards.
//!
//! Picks the outcome contexts to show from the card's outcome, delegates
//! grouping to a [`NodeTraversal`], and guarantees that a missed attack
//! shows exactly one "MISS" warning note.

use smallvec::{smallvec, SmallVec};

use crate::card::{ActivationCard, Outcome};
use crate::core::SyncConfig;

use super::node::{EffectNode, NoteType, OutcomeContext};
use super::traversal::NodeTraversal;

/// Authored notes reading this, in any case, already mark a miss.
const MISS_TEXT: &str = "MISS";

/// Contexts to evaluate for an outcome, in display order.
///
/// A critical hit is also a hit, so it shows both branches.
#[must_use]
pub fn contexts_for(outcome: Outcome) -> SmallVec<[OutcomeContext; 2]> {
    match outcome {
        Outcome::CriticalHit => smallvec![OutcomeContext::CriticalHit, OutcomeContext::Hit],
        Outcome::Miss => smallvec![OutcomeContext::Miss],
        Outcome::Hit => smallvec![OutcomeContext::Hit],
    }
}

/// Selects effect nodes to display for a card.
pub struct EffectSelector<'a, T: NodeTraversal> {
    traversal: &'a T,
    config: &'a SyncConfig,
}

impl<'a, T: NodeTraversal> EffectSelector<'a, T> {
    /// Create a selector over a traversal.
    pub fn new(traversal: &'a T, config: &'a SyncConfig) -> Self {
        Self { traversal, config }
    }

    /// Display groups for a card. Empty for inert cards.
    #[must_use]
    pub fn select(&self, card: &ActivationCard) -> Vec<Vec<EffectNode>> {
        if !card.is_activation_card() {
            return Vec::new();
        }
        self.select_display_nodes(&card.effects, card.outcome)
    }

    /// Display groups for an effect tree under an outcome.
    ///
    /// On a miss, base damage nodes are surfaced so players can see what
    /// would have landed, and a warning note is prepended unless some group
    /// already holds a note reading "miss" or the configured hint text, in
    /// any case.
    #[must_use]
    pub fn select_display_nodes(
        &self,
        effects: &[EffectNode],
        outcome: Outcome,
    ) -> Vec<Vec<EffectNode>> {
        let is_miss = outcome == Outcome::Miss;
        let contexts = contexts_for(outcome);
        let mut groups = self.traversal.relevant_nodes(effects, &contexts, is_miss);

        if is_miss && !self.has_miss_hint(&groups) {
            groups.insert(0, vec![self.miss_hint()]);
        }

        groups
    }

    fn has_miss_hint(&self, groups: &[Vec<EffectNode>]) -> bool {
        groups.iter().flatten().any(|node| {
            node.note_text().is_some_and(|text| {
                text.eq_ignore_ascii_case(MISS_TEXT)
                    || text.eq_ignore_ascii_case(&self.config.miss_hint_text)
            })
        })
    }

    fn miss_hint(&self) -> EffectNode {
        let mut node = EffectNode::note(
            self.config.miss_hint_id.clone(),
            NoteType::Warning,
            self.config.miss_hint_text.clone(),
        );
        node.parent_context = Some(OutcomeContext::Miss.key().to_string());
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardKind;
    use crate::effects::ContextTraversal;

    fn effects() -> Vec<EffectNode> {
        vec![EffectNode::damage("dmg", "1d8").with_child(
            OutcomeContext::Hit,
            EffectNode::note("shove", NoteType::General, "Push 1"),
        )]
    }

    #[test]
    fn test_contexts() {
        assert_eq!(
            contexts_for(Outcome::CriticalHit).as_slice(),
            &[OutcomeContext::CriticalHit, OutcomeContext::Hit]
        );
        assert_eq!(contexts_for(Outcome::Miss).as_slice(), &[OutcomeContext::Miss]);
        assert_eq!(contexts_for(Outcome::Hit).as_slice(), &[OutcomeContext::Hit]);
    }

    #[test]
    fn test_miss_prepends_hint_once() {
        let config = SyncConfig::default();
        let selector = EffectSelector::new(&ContextTraversal, &config);
        let groups = selector.select_display_nodes(&effects(), Outcome::Miss);

        assert_eq!(groups[0].len(), 1);
        assert_eq!(groups[0][0].id, "miss-hint");
        assert_eq!(groups[0][0].note_text(), Some("MISS"));
        assert!(matches!(
            groups[0][0].kind,
            crate::effects::NodeKind::Note { note_type: NoteType::Warning, .. }
        ));
        // base damage surfaced on a miss
        assert_eq!(groups[1][0].id, "dmg");

        let hints = groups
            .iter()
            .flatten()
            .filter(|n| n.note_text() == Some("MISS"))
            .count();
        assert_eq!(hints, 1);
    }

    #[test]
    fn test_existing_hint_is_not_duplicated() {
        let config = SyncConfig::default();
        let selector = EffectSelector::new(&ContextTraversal, &config);
        let tree = vec![EffectNode::damage("dmg", "1d8").with_child(
            OutcomeContext::Miss,
            EffectNode::note("authored", NoteType::General, "Miss"),
        )];

        let groups = selector.select_display_nodes(&tree, Outcome::Miss);
        assert!(groups.iter().flatten().all(|n| n.id != "miss-hint"));
    }

    #[test]
    fn test_authored_miss_counts_under_custom_hint() {
        let config = SyncConfig::default().with_miss_hint("Whiff");
        let selector = EffectSelector::new(&ContextTraversal, &config);
        let tree = vec![EffectNode::damage("dmg", "1d8").with_child(
            OutcomeContext::Miss,
            EffectNode::note("authored", NoteType::General, "Miss"),
        )];

        let groups = selector.select_display_nodes(&tree, Outcome::Miss);
        assert!(groups.iter().flatten().all(|n| n.id != "miss-hint"));
        assert!(groups.iter().flatten().all(|n| n.note_text() != Some("Whiff")));

        let plain = selector.select_display_nodes(&effects(), Outcome::Miss);
        assert_eq!(plain[0][0].note_text(), Some("Whiff"));
    }

    #[test]
    fn test_hit_has_no_hint() {
        let config = SyncConfig::default();
        let selector = EffectSelector::new(&ContextTraversal, &config);
        let groups = selector.select_display_nodes(&effects(), Outcome::Hit);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0][0].id, "shove");
    }

    #[test]
    fn test_inert_card_is_empty() {
        let config = SyncConfig::default();
        let selector = EffectSelector::new(&ContextTraversal, &config);
        let card = ActivationCard::new("m1", CardKind::Base)
            .with_outcome(Outcome::Miss)
            .with_effects(effects());
        assert!(selector.select(&card).is_empty());
    }
}
