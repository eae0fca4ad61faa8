//! Error taxonomy for card operations.
//!
//! Every caller-facing failure is a [`CardError`]. Its `Display` text is the
//! message shown to the user; [`CardError::severity`] picks between a warning
//! and an error toast. Unresolvable targets are never errors: batch
//! operations skip them silently.

use std::fmt;

/// Which card operation was attempted on a card without activation semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardAction {
    /// Adding or removing targets.
    ManageTargets,
    /// Choosing whether a target defends.
    SetDefend,
    /// Applying damage to targets.
    ApplyDamage,
}

impl fmt::Display for CardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CardAction::ManageTargets => {
                "Cannot open a target management window for this message type."
            }
            CardAction::SetDefend => "Cannot set defend options for this message type.",
            CardAction::ApplyDamage => "Cannot apply damage from this message type.",
        })
    }
}

/// Which token selection came up empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Tokens controlled on the canvas.
    Controlled,
    /// Tokens targeted by the user.
    Targeted,
    /// An explicit list of ids.
    Explicit,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Selection::Controlled => "No tokens selected",
            Selection::Targeted => "No tokens targeted",
            Selection::Explicit => "No tokens to add",
        })
    }
}

/// Which authorization check failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denied {
    /// The user may not choose Defend for that target.
    DefendChoice,
    /// Only a game master may apply damage.
    ApplyDamage,
}

impl fmt::Display for Denied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Denied::DefendChoice => "You do not have permission to choose Defend from this card.",
            Denied::ApplyDamage => "Only a GM can apply damage from chat cards.",
        })
    }
}

/// Failure reported by the host document layer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("document not found: {0}")]
    MissingDocument(String),

    #[error("update rejected: {0}")]
    Rejected(String),
}

/// Caller-facing failure of a card operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    #[error("{0}")]
    WrongCardType(CardAction),

    #[error("{0}")]
    EmptySelection(Selection),

    #[error("No targets selected for this card.")]
    NoTargets,

    #[error("{0}")]
    PermissionDenied(Denied),

    #[error("Defend is not available for that target.")]
    DefendUnavailable,

    #[error(transparent)]
    Host(#[from] HostError),
}

/// How loudly a failure is presented to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl CardError {
    /// Notification severity for this failure.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            CardError::EmptySelection(_) | CardError::Host(_) => Severity::Error,
            _ => Severity::Warning,
        }
    }
}
