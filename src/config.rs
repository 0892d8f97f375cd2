//! Configuration for the variation engine and CLI.
//!
//! Settings live in `<state-dir>/myls.toml` next to the persisted state. Every
//! section is optional; anything left out keeps the built-in value.
//!
//! # Configuration File Format
//!
//! ```toml
//! [engine]
//! similarity_threshold = 60.0
//! history_limit = 50
//! fingerprint_chars = 300
//! state_ttl_secs = 3600
//! default_context = "about_the_area"
//!
//! # Replaces the built-in pool for a context, or adds a new context.
//! [angles]
//! meta_title = ["benefit_led", "question_form"]
//!
//! [banned]
//! meta_title = ["best in town"]
//!
//! [pricing]
//! default_model = "gpt-4o-mini"
//!
//! [pricing.models."house-model"]
//! input = 1.0
//! output = 2.0
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::quality::{ModelPrice, PriceTable};
use crate::variation::{
    AnglePools, BannedPhrases, DEFAULT_CONTEXT, DEFAULT_FINGERPRINT_CHARS, DEFAULT_HISTORY_LIMIT,
    DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_STATE_TTL, VariationConfig,
};

/// Default state directory, relative to the working directory.
pub const STATE_DIR: &str = ".myls";

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "MYLS_STATE_DIR";

pub const CONFIG_FILE: &str = "myls.toml";

pub const STATE_FILE: &str = "state.json";

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_fingerprint_chars")]
    pub fingerprint_chars: usize,
    #[serde(default = "default_state_ttl_secs")]
    pub state_ttl_secs: u64,
    #[serde(default = "default_context")]
    pub default_context: String,
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_fingerprint_chars() -> usize {
    DEFAULT_FINGERPRINT_CHARS
}

fn default_state_ttl_secs() -> u64 {
    DEFAULT_STATE_TTL.as_secs()
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            history_limit: default_history_limit(),
            fingerprint_chars: default_fingerprint_chars(),
            state_ttl_secs: default_state_ttl_secs(),
            default_context: default_context(),
        }
    }
}

/// `[pricing]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<String, ModelPrice>,
}

/// Contents of `myls.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MylsToml {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub angles: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub banned: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub pricing: PricingSection,
}

impl MylsToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse myls.toml")
    }

    /// Load `myls.toml` from `state_dir`, or defaults when the file doesn't exist.
    pub fn load_or_default(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize myls.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Non-fatal problems worth showing to the user.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !(0.0..=100.0).contains(&self.engine.similarity_threshold) {
            warnings.push(format!(
                "similarity_threshold {} is outside 0-100",
                self.engine.similarity_threshold
            ));
        }
        if self.engine.history_limit == 0 {
            warnings.push("history_limit must be greater than zero".to_string());
        }
        if self.engine.fingerprint_chars == 0 {
            warnings.push("fingerprint_chars must be greater than zero".to_string());
        }
        if self.engine.state_ttl_secs == 0 {
            warnings.push(
                "state_ttl_secs is 0: counters and history expire immediately".to_string(),
            );
        }

        for (context, pool) in &self.angles {
            if pool.is_empty() {
                warnings.push(format!(
                    "Angle pool for '{}' is empty; it will rotate through '{}' instead",
                    context, self.engine.default_context
                ));
            }
        }

        let pools = self.angle_pools();
        if pools.get(&self.engine.default_context).is_empty() {
            warnings.push(format!(
                "default_context '{}' has no angle pool",
                self.engine.default_context
            ));
        }

        if let Some(model) = &self.pricing.default_model {
            let mut prices = self.price_table();
            if !prices.set_default_model(model) {
                warnings.push(format!(
                    "Pricing default_model '{}' is not in the price table",
                    model
                ));
            }
        }
        for (model, price) in &self.pricing.models {
            if price.input < 0.0 || price.output < 0.0 {
                warnings.push(format!("Negative price for model '{}'", model));
            }
        }

        warnings
    }

    /// Built-in pools with this file's pools laid over them.
    pub fn angle_pools(&self) -> AnglePools {
        let mut pools = AnglePools::builtin();
        pools.set_default_context(&self.engine.default_context);
        for (context, pool) in &self.angles {
            pools.insert(context, pool.clone());
        }
        pools
    }

    pub fn banned_phrases(&self) -> BannedPhrases {
        let mut banned = BannedPhrases::builtin();
        for (context, phrases) in &self.banned {
            banned.insert(context, phrases.clone());
        }
        banned
    }

    pub fn price_table(&self) -> PriceTable {
        let mut prices = PriceTable::builtin();
        for (model, price) in &self.pricing.models {
            prices.insert(model, *price);
        }
        if let Some(model) = &self.pricing.default_model {
            prices.set_default_model(model);
        }
        prices
    }

    /// Engine configuration; not yet validated.
    pub fn variation_config(&self) -> VariationConfig {
        VariationConfig {
            angles: self.angle_pools(),
            banned: self.banned_phrases(),
            similarity_threshold: self.engine.similarity_threshold,
            history_limit: self.engine.history_limit,
            fingerprint_chars: self.engine.fingerprint_chars,
            state_ttl: Duration::from_secs(self.engine.state_ttl_secs),
        }
    }
}

/// Resolved locations and settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub config_file: PathBuf,
    pub state_file: PathBuf,
    pub toml: MylsToml,
}

impl Config {
    /// Resolve the state directory (flag, then `MYLS_STATE_DIR`, then `.myls`)
    /// and load `myls.toml` from it.
    pub fn load(state_dir: Option<&Path>) -> Result<Self> {
        let state_dir = resolve_state_dir(state_dir);
        let toml = MylsToml::load_or_default(&state_dir)?;
        Ok(Self {
            config_file: state_dir.join(CONFIG_FILE),
            state_file: state_dir.join(STATE_FILE),
            state_dir,
            toml,
        })
    }
}

pub fn resolve_state_dir(cli_override: Option<&Path>) -> PathBuf {
    if let Some(dir) = cli_override {
        return dir.to_path_buf();
    }
    std::env::var(STATE_DIR_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(STATE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_empty_file_is_default() {
        let toml = MylsToml::parse("").unwrap();
        assert_eq!(toml, MylsToml::default());
        assert_eq!(toml.engine.similarity_threshold, 60.0);
        assert_eq!(toml.engine.history_limit, 50);
        assert_eq!(toml.engine.default_context, "about_the_area");
    }

    #[test]
    fn test_parse_full_file() {
        let toml = MylsToml::parse(
            r#"
[engine]
similarity_threshold = 75.0
history_limit = 20

[angles]
meta_title = ["a", "b"]
roof_faq = ["x"]

[banned]
roof_faq = ["shingle-tastic"]

[pricing]
default_model = "house-model"

[pricing.models."house-model"]
input = 1.0
output = 2.0
"#,
        )
        .unwrap();

        assert_eq!(toml.engine.similarity_threshold, 75.0);
        assert_eq!(toml.engine.history_limit, 20);
        assert_eq!(toml.engine.fingerprint_chars, 300);

        let config = toml.variation_config();
        assert_eq!(config.angles.get("meta_title"), &["a".to_string(), "b".to_string()]);
        assert_eq!(config.angles.get("roof_faq"), &["x".to_string()]);
        // Untouched built-ins survive.
        assert!(!config.angles.get("faq_answer").is_empty());
        assert_eq!(config.banned.get("roof_faq"), &["shingle-tastic".to_string()]);
        assert!(config.validate().is_ok());

        let prices = toml.price_table();
        assert_eq!(prices.default_model(), "house-model");
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(MylsToml::parse("[engine\nhistory_limit = ").is_err());
    }

    #[test]
    fn test_validate_warnings() {
        let mut toml = MylsToml::default();
        toml.engine.similarity_threshold = 150.0;
        toml.engine.history_limit = 0;
        toml.engine.default_context = "nowhere".to_string();
        toml.angles.insert("hollow".to_string(), Vec::new());
        toml.pricing.default_model = Some("mystery".to_string());

        let warnings = toml.validate();
        assert!(warnings.iter().any(|w| w.contains("similarity_threshold")));
        assert!(warnings.iter().any(|w| w.contains("history_limit")));
        assert!(warnings.iter().any(|w| w.contains("'hollow'")));
        assert!(warnings.iter().any(|w| w.contains("default_context 'nowhere'")));
        assert!(warnings.iter().any(|w| w.contains("'mystery'")));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let mut toml = MylsToml::default();
        toml.angles
            .insert("meta_title".to_string(), vec!["one".to_string()]);
        let path = dir.path().join(CONFIG_FILE);
        toml.save(&path).unwrap();

        let loaded = MylsToml::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded, toml);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempdir().unwrap();
        let loaded = MylsToml::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded, MylsToml::default());
    }

    #[test]
    fn test_state_dir_resolution() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let flag = PathBuf::from("/tmp/flag-dir");
        assert_eq!(resolve_state_dir(Some(&flag)), flag);

        // SAFETY: ENV_MUTEX serializes every test here that touches the variable.
        unsafe { std::env::set_var(STATE_DIR_ENV, "/tmp/env-dir") };
        assert_eq!(resolve_state_dir(None), PathBuf::from("/tmp/env-dir"));
        unsafe { std::env::remove_var(STATE_DIR_ENV) };
        assert_eq!(resolve_state_dir(None), PathBuf::from(STATE_DIR));
    }

    #[test]
    fn test_config_load_paths() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.state_file, dir.path().join(STATE_FILE));
        assert_eq!(config.config_file, dir.path().join(CONFIG_FILE));
    }
}
