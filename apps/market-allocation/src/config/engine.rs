//! Allocation engine settings.

use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Expansion rounds for seeds that carry no limit of their own.
    #[serde(default)]
    pub expansion_limit: Option<usize>,
    /// Check ledger invariants on the final state.
    #[serde(default = "default_true")]
    pub verify_invariants: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expansion_limit: None,
            verify_invariants: true,
        }
    }
}

pub(crate) const fn default_true() -> bool {
    true
}
