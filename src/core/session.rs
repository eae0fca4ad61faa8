//! Acting-session context.
//!
//! Everything an operation needs to know about "who is acting" and "what
//! they have selected" travels in an explicit [`Session`] value instead of
//! being read from process-wide state.

use serde::{Deserialize, Serialize};

use super::ids::{TargetId, UserId};

/// A connected user as seen by permission checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User identifier.
    pub id: UserId,
    /// Game-master (administrator) privileges.
    pub is_gm: bool,
}

impl UserRecord {
    /// Create a regular player user.
    pub fn player(id: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            is_gm: false,
        }
    }

    /// Create a game-master user.
    pub fn gm(id: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            is_gm: true,
        }
    }
}

/// The acting user plus their current canvas selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The user performing the operation.
    pub user: UserRecord,

    /// Tokens the user currently controls (selected on the canvas).
    #[serde(default)]
    pub controlled: Vec<TargetId>,

    /// Tokens the user currently targets.
    #[serde(default)]
    pub targeted: Vec<TargetId>,
}

impl Session {
    /// Create a session with an empty selection.
    pub fn new(user: UserRecord) -> Self {
        Self {
            user,
            controlled: Vec::new(),
            targeted: Vec::new(),
        }
    }

    /// Set the controlled tokens (builder pattern).
    #[must_use]
    pub fn with_controlled(mut self, tokens: impl IntoIterator<Item = TargetId>) -> Self {
        self.controlled = tokens.into_iter().collect();
        self
    }

    /// Set the targeted tokens (builder pattern).
    #[must_use]
    pub fn with_targeted(mut self, tokens: impl IntoIterator<Item = TargetId>) -> Self {
        self.targeted = tokens.into_iter().collect();
        self
    }

    /// Whether the acting user has game-master privileges.
    #[must_use]
    pub fn is_gm(&self) -> bool {
        self.user.is_gm
    }
}
