//! Engine settings.
//!
//! Hosts hand settings over as JSON (the shape their plugin-settings
//! storage already speaks); every field is optional and falls back to its
//! default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::debounce::DEFAULT_DEBOUNCE_DURATION;
use crate::error::{SyncError, SyncResult};

/// Tunable behavior of the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Milliseconds of quiet time after the last edit before propagation.
    pub debounce_ms: u64,

    /// Skip at-rest documents that were already rewritten through their
    /// open editor in the same pass. Skipping only avoids a redundant
    /// idempotent write; both settings converge to the same content.
    pub skip_open_documents_in_vault_pass: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_DURATION.as_millis() as u64,
            skip_open_documents_in_vault_pass: true,
        }
    }
}

impl Settings {
    /// Parse settings from host-supplied JSON.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        serde_json::from_str(json).map_err(|e| SyncError::config(e.to_string()))
    }

    /// The debounce interval as a [`Duration`].
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
