//! Effect tree display selection.
//!
//! - [`EffectNode`]: one node of an activation's effect tree
//! - [`NodeTraversal`]: contract for grouping relevant nodes by context
//! - [`EffectSelector`]: outcome-aware selection with the miss hint
//!
//! The selector is a pure function of the card: it reads the outcome and
//! the effect tree and never touches host state.

mod node;
mod selector;
mod traversal;

pub use node::{EffectNode, NodeKind, NoteType, OutcomeContext};
pub use selector::{contexts_for, EffectSelector};
pub use traversal::{ContextTraversal, NodeTraversal};
