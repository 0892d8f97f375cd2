//! Engine configuration: tables plus the numeric limits of the duplicate guard.

use std::time::Duration;

use super::angles::AnglePools;
use super::banned::BannedPhrases;
use super::{
    DEFAULT_FINGERPRINT_CHARS, DEFAULT_HISTORY_LIMIT, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_STATE_TTL,
};
use crate::errors::ConfigError;

/// Everything a [`VariationEngine`](super::VariationEngine) reads at runtime.
///
/// Immutable once the engine is built. Tests substitute their own pools by
/// constructing one of these directly.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationConfig {
    pub angles: AnglePools,
    pub banned: BannedPhrases,
    /// Percentage a fingerprint must strictly exceed to trigger a rewrite.
    pub similarity_threshold: f64,
    /// Maximum fingerprints kept per context.
    pub history_limit: usize,
    /// Characters of stripped text kept per fingerprint.
    pub fingerprint_chars: usize,
    /// Lifetime of counters and history in the store.
    pub state_ttl: Duration,
}

impl Default for VariationConfig {
    fn default() -> Self {
        Self {
            angles: AnglePools::builtin(),
            banned: BannedPhrases::builtin(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            history_limit: DEFAULT_HISTORY_LIMIT,
            fingerprint_chars: DEFAULT_FINGERPRINT_CHARS,
            state_ttl: DEFAULT_STATE_TTL,
        }
    }
}

impl VariationConfig {
    /// Check the invariants rotation and the guard rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let default_context = self.angles.default_context();
        if self.angles.get(default_context).is_empty() {
            return Err(ConfigError::MissingDefaultPool {
                context: default_context.to_string(),
            });
        }
        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::ThresholdOutOfRange {
                value: self.similarity_threshold,
            });
        }
        if self.history_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "history_limit",
            });
        }
        if self.fingerprint_chars == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "fingerprint_chars",
            });
        }
        Ok(())
    }
}
