//! Effect tree traversal.
//!
//! Selecting which nodes are relevant for a set of outcome contexts belongs
//! to the rules data model, so it sits behind the [`NodeTraversal`] trait.
//! [`ContextTraversal`] is the stock implementation.

use super::node::{EffectNode, OutcomeContext};

/// Selects and groups effect nodes for display.
pub trait NodeTraversal {
    /// Return display groups for the given contexts, in display order.
    ///
    /// `include_base_damage` asks for top-level damage rolls to be surfaced
    /// as their own groups even though they would normally be shown by the
    /// roll itself.
    fn relevant_nodes(
        &self,
        effects: &[EffectNode],
        contexts: &[OutcomeContext],
        include_base_damage: bool,
    ) -> Vec<Vec<EffectNode>>;
}

/// Stock traversal over top-level nodes and their context branches.
///
/// Produces, in order:
/// 1. One group with every top-level node that is not a damage roll.
/// 2. For each top-level node with branches: the node itself when it is a
///    base damage roll and base damage is requested, followed by one group
///    per requested context holding that context's children.
///
/// Empty groups are never emitted.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextTraversal;

impl NodeTraversal for ContextTraversal {
    fn relevant_nodes(
        &self,
        effects: &[EffectNode],
        contexts: &[OutcomeContext],
        include_base_damage: bool,
    ) -> Vec<Vec<EffectNode>> {
        let mut groups = Vec::new();

        let direct: Vec<EffectNode> = effects
            .iter()
            .filter(|node| !node.is_base_damage())
            .map(|node| strip_branches(node))
            .collect();
        if !direct.is_empty() {
            groups.push(direct);
        }

        for node in effects {
            if include_base_damage && node.is_base_damage() {
                groups.push(vec![strip_branches(node)]);
            }

            for context in contexts {
                let children = node.children(*context);
                if !children.is_empty() {
                    groups.push(children.to_vec());
                }
            }
        }

        groups
    }
}

fn strip_branches(node: &EffectNode) -> EffectNode {
    let mut node = node.clone();
    node.on.clear();
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::node::NoteType;

    fn tree() -> Vec<EffectNode> {
        vec![
            EffectNode::note("intro", NoteType::Flavor, "A bolt of fire"),
            EffectNode::damage("dmg", "2d6")
                .with_child(
                    OutcomeContext::Hit,
                    EffectNode::note("burn", NoteType::General, "Target burns"),
                )
                .with_child(
                    OutcomeContext::CriticalHit,
                    EffectNode::note("crit", NoteType::General, "Target explodes"),
                )
                .with_child(
                    OutcomeContext::Miss,
                    EffectNode::note("singe", NoteType::General, "Singed"),
                ),
        ]
    }

    #[test]
    fn test_hit_groups() {
        let groups = ContextTraversal.relevant_nodes(&tree(), &[OutcomeContext::Hit], false);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0].id, "intro");
        assert_eq!(groups[1][0].id, "burn");
    }

    #[test]
    fn test_context_order_is_preserved() {
        let groups = ContextTraversal.relevant_nodes(
            &tree(),
            &[OutcomeContext::CriticalHit, OutcomeContext::Hit],
            false,
        );
        let ids: Vec<&str> = groups.iter().map(|g| g[0].id.as_str()).collect();
        assert_eq!(ids, ["intro", "crit", "burn"]);
    }

    #[test]
    fn test_base_damage_on_request() {
        let groups = ContextTraversal.relevant_nodes(&tree(), &[OutcomeContext::Miss], true);
        let ids: Vec<&str> = groups.iter().map(|g| g[0].id.as_str()).collect();
        assert_eq!(ids, ["intro", "dmg", "singe"]);
        assert!(groups[1][0].on.is_empty());
    }

    #[test]
    fn test_empty_tree() {
        assert!(ContextTraversal
            .relevant_nodes(&[], &[OutcomeContext::Hit], true)
            .is_empty());
    }
}
