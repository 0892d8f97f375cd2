//! The variation engine service object.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::angles::rotation_index;
use super::config::VariationConfig;
use super::prompt::build_variation_block;
use super::session::VariationSession;
use super::similarity::{fingerprint, scan_history};
use crate::errors::ConfigError;
use crate::store::{KeyValueStore, angle_key, batch_key};

/// Outcome of one angle request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleSelection {
    /// Context the caller asked for.
    pub context: String,
    /// Context whose pool supplied the angle (differs on fallback).
    pub pool_context: String,
    pub angle: String,
    pub index: usize,
    pub pool_size: usize,
    /// Counter value read before this request incremented it.
    pub counter: u64,
}

/// Outcome of one duplicate check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardOutcome {
    /// Content to publish: the rewrite when one was applied, else the input.
    pub content: String,
    /// Fingerprint appended to the history.
    pub fingerprint: String,
    /// History length before this call appended to it.
    pub batch_size: usize,
    pub max_similarity: f64,
    pub match_index: Option<usize>,
    /// Similarity crossed the threshold and the rewrite callback ran.
    pub rewrite_triggered: bool,
    /// The callback returned non-empty content that replaced the input.
    pub rewrite_applied: bool,
}

/// Owns the keyed store and the configuration tables.
///
/// Store failures never surface from here: a failed read is treated as an
/// absent key and a failed write is logged and skipped, so a batch keeps
/// running on per-request state when persistence is unavailable.
pub struct VariationEngine<S> {
    store: S,
    config: VariationConfig,
}

impl<S: KeyValueStore> VariationEngine<S> {
    pub fn new(store: S, config: VariationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Engine over the built-in pools, phrases and limits.
    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            config: VariationConfig::default(),
        }
    }

    pub fn config(&self) -> &VariationConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a logical operation with its own request log.
    pub fn session(&self) -> VariationSession<'_, S> {
        VariationSession::new(self)
    }

    /// Pick the next angle for `context` and advance its counter.
    ///
    /// Contexts without a pool rotate through the default context's pool,
    /// but keep their own counter.
    pub fn next_angle(&self, context: &str) -> AngleSelection {
        let key = angle_key(context);
        let counter = self
            .read(&key)
            .and_then(|value| value.as_u64())
            .unwrap_or(0);

        let (pool_context, pool) = self.config.angles.resolve(context);
        let index = rotation_index(counter, pool.len());
        let angle = pool.get(index).cloned().unwrap_or_default();

        self.write(&key, Value::from(counter.wrapping_add(1)));
        debug!(context, angle = %angle, index, pool_size = pool.len(), "angle selected");

        AngleSelection {
            context: context.to_string(),
            pool_context: pool_context.to_string(),
            angle,
            index,
            pool_size: pool.len(),
            counter,
        }
    }

    /// Forget the rotation counter so the next request starts at index 0.
    /// Returns `false` when the store could not delete the counter.
    pub fn reset_angle(&self, context: &str) -> bool {
        self.remove(&angle_key(context))
    }

    /// The pool configured for exactly `context`, without fallback.
    pub fn get_angles(&self, context: &str) -> &[String] {
        self.config.angles.get(context)
    }

    pub fn get_banned_phrases(&self, context: &str) -> &[String] {
        self.config.banned.get(context)
    }

    /// Append the variation block for `angle` and the context's banned phrases.
    pub fn inject_variation(&self, base_prompt: &str, angle: &str, context: &str) -> String {
        build_variation_block(base_prompt, angle, self.get_banned_phrases(context))
    }

    /// Check `html` against the context's recent output and rewrite it once if
    /// it is too similar.
    ///
    /// `rewrite` receives the original HTML. An empty (or whitespace-only)
    /// result keeps the original. An error from `rewrite` is returned as is and
    /// leaves the history untouched.
    pub fn guard_duplicates<F, E>(
        &self,
        context: &str,
        html: &str,
        rewrite: F,
    ) -> Result<GuardOutcome, E>
    where
        F: FnOnce(&str) -> Result<String, E>,
    {
        let mut history = self.history(context);
        let batch_size = history.len();
        let candidate = fingerprint(html, self.config.fingerprint_chars);
        let scan = scan_history(&history, &candidate, self.config.similarity_threshold);

        let mut content = html.to_string();
        let mut final_fingerprint = candidate;
        let mut rewrite_applied = false;

        if scan.exceeded {
            warn!(
                context,
                similarity = scan.max_similarity,
                match_index = ?scan.match_index,
                batch_size,
                "near-duplicate output, requesting rewrite"
            );
            let rewritten = rewrite(html)?;
            if !rewritten.trim().is_empty() {
                final_fingerprint = fingerprint(&rewritten, self.config.fingerprint_chars);
                content = rewritten;
                rewrite_applied = true;
            }
        }

        history.push(final_fingerprint.clone());
        if history.len() > self.config.history_limit {
            let excess = history.len() - self.config.history_limit;
            history.drain(..excess);
        }
        self.write(&batch_key(context), Value::from(history));

        Ok(GuardOutcome {
            content,
            fingerprint: final_fingerprint,
            batch_size,
            max_similarity: scan.max_similarity,
            match_index: scan.match_index,
            rewrite_triggered: scan.exceeded,
            rewrite_applied,
        })
    }

    /// Fingerprints currently remembered for `context`, oldest first.
    pub fn history(&self, context: &str) -> Vec<String> {
        match self.read(&batch_key(context)) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Drop both the rotation counter and the history for `context`.
    /// Returns `false` when either delete failed.
    pub fn clear_batch(&self, context: &str) -> bool {
        let counter = self.remove(&angle_key(context));
        let history = self.remove(&batch_key(context));
        counter && history
    }

    fn read(&self, key: &str) -> Option<Value> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "state read failed, treating as absent");
                None
            }
        }
    }

    fn write(&self, key: &str, value: Value) {
        if let Err(e) = self.store.set(key, value, self.config.state_ttl) {
            warn!(key, error = %e, "state write failed, continuing without persistence");
        }
    }

    fn remove(&self, key: &str) -> bool {
        match self.store.delete(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "state delete failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::store::{FileStore, MemoryStore};
    use crate::variation::angles::AnglePools;
    use std::convert::Infallible;
    use std::time::Duration;

    fn engine() -> VariationEngine<MemoryStore> {
        VariationEngine::with_defaults(MemoryStore::new())
    }

    fn never(_: &str) -> Result<String, Infallible> {
        panic!("rewrite must not be called")
    }

    fn padded(text: &str) -> String {
        let mut s = text.to_string();
        while s.chars().count() < 300 {
            s.push_str(" and more of the same opening text");
        }
        s
    }

    /// Paragraph sharing no characters with any other `distinct(m)`.
    fn distinct(n: usize) -> String {
        let c = char::from_u32(0x4E00 + n as u32).unwrap();
        format!("<p>{}</p>", c.to_string().repeat(10))
    }

    #[test]
    fn test_rotation_visits_pool_in_order_then_wraps() {
        let engine = engine();
        let pool = engine.get_angles("meta_title").to_vec();
        for expected in &pool {
            assert_eq!(&engine.next_angle("meta_title").angle, expected);
        }
        assert_eq!(engine.next_angle("meta_title").angle, pool[0]);
    }

    #[test]
    fn test_selection_metadata() {
        let engine = engine();
        engine.next_angle("faq_answer");
        let sel = engine.next_angle("faq_answer");
        assert_eq!(sel.index, 1);
        assert_eq!(sel.counter, 1);
        assert_eq!(sel.pool_size, 4);
        assert_eq!(sel.pool_context, "faq_answer");
    }

    #[test]
    fn test_reset_matches_fresh_context() {
        let engine = engine();
        engine.next_angle("meta_title");
        engine.next_angle("meta_title");
        engine.reset_angle("meta_title");
        let after_reset = engine.next_angle("meta_title").angle;

        let fresh = self::engine().next_angle("meta_title").angle;
        assert_eq!(after_reset, fresh);
    }

    #[test]
    fn test_reset_missing_counter_is_noop() {
        let engine = engine();
        engine.reset_angle("never_used");
        assert_eq!(engine.next_angle("never_used").index, 0);
    }

    #[test]
    fn test_unknown_context_uses_default_pool_with_own_counter() {
        let engine = engine();
        let default_pool = engine.get_angles("about_the_area").to_vec();
        let first = engine.next_angle("gutter_cleaning_blurb");
        assert_eq!(first.pool_context, "about_the_area");
        assert_eq!(first.angle, default_pool[0]);

        // The default context's own counter is independent.
        assert_eq!(engine.next_angle("about_the_area").index, 0);
        assert_eq!(engine.next_angle("gutter_cleaning_blurb").index, 1);
    }

    #[test]
    fn test_get_angles_does_not_fall_back() {
        let engine = engine();
        assert!(engine.get_angles("gutter_cleaning_blurb").is_empty());
    }

    #[test]
    fn test_custom_pool() {
        let mut config = VariationConfig::default();
        let mut pools = AnglePools::new("only");
        pools.insert("only", vec!["x".to_string(), "y".to_string()]);
        config.angles = pools;
        let engine = VariationEngine::new(MemoryStore::new(), config).unwrap();
        assert_eq!(engine.next_angle("anything").angle, "x");
        assert_eq!(engine.next_angle("anything").angle, "y");
        assert_eq!(engine.next_angle("anything").angle, "x");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = VariationConfig::default();
        config.history_limit = 0;
        assert!(VariationEngine::new(MemoryStore::new(), config).is_err());
    }

    #[test]
    fn test_inject_variation_includes_angle_and_context_phrases() {
        let engine = engine();
        let out = engine.inject_variation("Write an intro.", "history_first", "about_the_area");
        assert!(out.contains("history_first"));
        for phrase in engine.get_banned_phrases("about_the_area") {
            assert_eq!(out.matches(&format!("\"{}\"", phrase)).count(), 1);
        }
    }

    #[test]
    fn test_inject_variation_without_banned_list() {
        let engine = engine();
        let out = engine.inject_variation("Base", "angle_x", "no_banned_here");
        assert!(out.contains("angle_x"));
        assert!(!out.contains("BANNED PHRASES"));
    }

    #[test]
    fn test_guard_empty_history_passes_through() {
        let engine = engine();
        let html = "<p>First page about Tampa.</p>";
        let outcome = engine.guard_duplicates("about_the_area", html, never).unwrap();
        assert_eq!(outcome.content, html);
        assert_eq!(outcome.batch_size, 0);
        assert!(!outcome.rewrite_triggered);
        assert_eq!(engine.history("about_the_area").len(), 1);
    }

    #[test]
    fn test_guard_identical_content_rewrites_once() {
        let engine = engine();
        let text = padded("Same opening text");
        let html = format!("<p>{}</p>", text);
        engine
            .guard_duplicates("about_the_area", &html, never)
            .unwrap();

        let mut calls = 0;
        let outcome = engine
            .guard_duplicates("about_the_area", &html, |original| {
                calls += 1;
                assert_eq!(original, html);
                Ok::<_, Infallible>("<p>Completely different copy about Orlando.</p>".to_string())
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(outcome.max_similarity, 100.0);
        assert_eq!(outcome.match_index, Some(0));
        assert!(outcome.rewrite_triggered);
        assert!(outcome.rewrite_applied);
        assert_eq!(outcome.content, "<p>Completely different copy about Orlando.</p>");
        assert_eq!(
            engine.history("about_the_area")[1],
            "Completely different copy about Orlando."
        );
    }

    #[test]
    fn test_guard_empty_rewrite_keeps_original() {
        let engine = engine();
        let html = "<p>Identical paragraph text.</p>";
        engine.guard_duplicates("faq_answer", html, never).unwrap();
        let outcome = engine
            .guard_duplicates("faq_answer", html, |_| Ok::<_, Infallible>("   ".to_string()))
            .unwrap();
        assert!(outcome.rewrite_triggered);
        assert!(!outcome.rewrite_applied);
        assert_eq!(outcome.content, html);
        assert_eq!(engine.history("faq_answer").len(), 2);
    }

    #[test]
    fn test_guard_rewrite_error_propagates_and_keeps_history() {
        let engine = engine();
        let html = "<p>Identical paragraph text.</p>";
        engine.guard_duplicates("faq_answer", html, never).unwrap();
        let result = engine.guard_duplicates("faq_answer", html, |_| {
            Err::<String, _>("generation failed".to_string())
        });
        assert_eq!(result.unwrap_err(), "generation failed");
        assert_eq!(engine.history("faq_answer").len(), 1);
    }

    #[test]
    fn test_guard_history_caps_at_limit() {
        let engine = engine();
        let items: Vec<String> = (0..51).map(distinct).collect();
        for item in &items {
            let outcome = engine
                .guard_duplicates("meta_description", item, never)
                .unwrap();
            assert!(!outcome.rewrite_triggered);
        }
        let history = engine.history("meta_description");
        assert_eq!(history.len(), 50);
        let expected: Vec<String> = items[1..]
            .iter()
            .map(|html| fingerprint(html, 300))
            .collect();
        assert_eq!(history, expected);
    }

    #[test]
    fn test_clear_batch_resets_counter_and_history() {
        let engine = engine();
        engine.next_angle("meta_title");
        engine.next_angle("meta_title");
        engine
            .guard_duplicates("meta_title", "<p>Some title</p>", never)
            .unwrap();

        engine.clear_batch("meta_title");
        assert_eq!(engine.next_angle("meta_title").index, 0);
        assert!(engine.history("meta_title").is_empty());
        let outcome = engine
            .guard_duplicates("meta_title", "<p>Some title</p>", never)
            .unwrap();
        assert_eq!(outcome.batch_size, 0);
    }

    #[test]
    fn test_state_expires_with_ttl() {
        let mut config = VariationConfig::default();
        config.state_ttl = Duration::ZERO;
        let engine = VariationEngine::new(MemoryStore::new(), config).unwrap();
        engine.next_angle("meta_title");
        assert_eq!(engine.next_angle("meta_title").index, 0);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::LockPoisoned)
        }
        fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), StoreError> {
            Err(StoreError::LockPoisoned)
        }
        fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::LockPoisoned)
        }
    }

    #[test]
    fn test_broken_store_degrades_without_failing() {
        let engine = VariationEngine::with_defaults(BrokenStore);
        let sel = engine.next_angle("meta_title");
        assert_eq!(sel.index, 0);
        let outcome = engine
            .guard_duplicates("meta_title", "<p>x</p>", never)
            .unwrap();
        assert_eq!(outcome.batch_size, 0);
        assert!(!engine.clear_batch("meta_title"));
        assert!(!engine.reset_angle("meta_title"));
    }

    #[test]
    fn test_rotation_recovers_from_corrupt_state_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\"myls_angle_meta_title\": {\"value\": 2,").unwrap();
        let engine = VariationEngine::with_defaults(FileStore::new(&path));

        let indices: Vec<usize> = (0..3)
            .map(|_| engine.next_angle("meta_title").index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);

        assert!(engine.clear_batch("meta_title"));
        assert_eq!(engine.next_angle("meta_title").index, 0);
        assert!(dir.path().join("state.json.corrupt").exists());
    }
}
