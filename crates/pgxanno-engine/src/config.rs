use serde::{Deserialize, Serialize};

/// Default p-value cut-off for deriving significance.
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Engine settings. Vocabulary is injected separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fan resolution and validation out over the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    /// A p-value at or below this is significant when no explicit
    /// significance candidate exists.
    #[serde(default = "default_threshold")]
    pub significance_threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_SIGNIFICANCE_THRESHOLD
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
        }
    }
}
