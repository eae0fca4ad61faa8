//! Synchronization configuration.
//!
//! Hosts configure the sync layer at startup by providing a `SyncConfig`.
//! Every field has a sensible default, so most hosts only override the
//! status id their rules system uses for defeated creatures.

use serde::{Deserialize, Serialize};

/// Configuration shared by every component of the sync layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Status effect toggled on an actor whose non-player participants are defeated.
    pub defeated_status_id: String,

    /// Text of the warning note synthesized when an attack misses.
    pub miss_hint_text: String,

    /// Node id given to the synthesized miss note.
    pub miss_hint_id: String,

    /// Run defeat reconciliation when a participant is linked to an actor.
    pub reconcile_on_create: bool,

    /// Advance the turn when the defeated participant holds the current turn.
    pub auto_advance_turn: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            defeated_status_id: "dead".to_string(),
            miss_hint_text: "MISS".to_string(),
            miss_hint_id: "miss-hint".to_string(),
            reconcile_on_create: true,
            auto_advance_turn: true,
        }
    }
}

impl SyncConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the defeated status id (builder pattern).
    #[must_use]
    pub fn with_defeated_status(mut self, status_id: impl Into<String>) -> Self {
        self.defeated_status_id = status_id.into();
        self
    }

    /// Set the miss hint text (builder pattern).
    #[must_use]
    pub fn with_miss_hint(mut self, text: impl Into<String>) -> Self {
        self.miss_hint_text = text.into();
        self
    }

    /// Enable or disable reconciliation on participant creation (builder pattern).
    #[must_use]
    pub fn with_reconcile_on_create(mut self, enabled: bool) -> Self {
        self.reconcile_on_create = enabled;
        self
    }

    /// Enable or disable automatic turn advance (builder pattern).
    #[must_use]
    pub fn with_auto_advance_turn(mut self, enabled: bool) -> Self {
        self.auto_advance_turn = enabled;
        self
    }
}
