//! Request-scoped logging around engine calls.
//!
//! A [`VariationSession`] wraps one logical operation (say, generating the
//! copy for one service-area page). Every call made through it records its
//! outcome into the session's [`RequestLog`], which the caller reads once at
//! the end to build an item log. Sessions share nothing with each other, so
//! two operations in flight never see each other's log.

use serde::{Deserialize, Serialize};

use super::engine::{AngleSelection, GuardOutcome, VariationEngine};
use crate::store::KeyValueStore;

/// What the engine did during one logical operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestLog {
    pub context: Option<String>,
    pub angle: Option<String>,
    pub angle_index: Option<usize>,
    pub angle_pool_size: Option<usize>,
    /// Context whose pool served the angle; differs from `context` on fallback.
    pub angle_pool_context: Option<String>,
    pub banned_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub banned_phrases: Vec<String>,
    pub dup_checked: bool,
    pub dup_batch_size: usize,
    pub dup_max_similarity: f64,
    pub dup_match_index: Option<usize>,
    pub dup_rewrite_triggered: bool,
    pub dup_rewrite_applied: bool,
}

impl RequestLog {
    pub fn record_angle(&mut self, selection: &AngleSelection) {
        self.context = Some(selection.context.clone());
        self.angle = Some(selection.angle.clone());
        self.angle_index = Some(selection.index);
        self.angle_pool_size = Some(selection.pool_size);
        self.angle_pool_context = Some(selection.pool_context.clone());
    }

    pub fn record_banned(&mut self, phrases: &[String]) {
        self.banned_count = phrases.len();
        self.banned_phrases = phrases.to_vec();
    }

    pub fn record_guard(&mut self, context: &str, outcome: &GuardOutcome) {
        if self.context.is_none() {
            self.context = Some(context.to_string());
        }
        self.dup_checked = true;
        self.dup_batch_size = outcome.batch_size;
        self.dup_max_similarity = (outcome.max_similarity * 100.0).round() / 100.0;
        self.dup_match_index = outcome.match_index;
        self.dup_rewrite_triggered = outcome.rewrite_triggered;
        self.dup_rewrite_applied = outcome.rewrite_applied;
    }
}

pub struct VariationSession<'e, S> {
    engine: &'e VariationEngine<S>,
    log: RequestLog,
}

impl<'e, S: KeyValueStore> VariationSession<'e, S> {
    pub fn new(engine: &'e VariationEngine<S>) -> Self {
        Self {
            engine,
            log: RequestLog::default(),
        }
    }

    pub fn engine(&self) -> &'e VariationEngine<S> {
        self.engine
    }

    pub fn next_angle(&mut self, context: &str) -> String {
        let selection = self.engine.next_angle(context);
        self.log.record_angle(&selection);
        selection.angle
    }

    pub fn inject_variation(&mut self, base_prompt: &str, angle: &str, context: &str) -> String {
        self.log.record_banned(self.engine.get_banned_phrases(context));
        self.engine.inject_variation(base_prompt, angle, context)
    }

    /// Same contract as [`VariationEngine::guard_duplicates`]; returns the
    /// final content and records the check. A failed rewrite records nothing.
    pub fn guard_duplicates<F, E>(
        &mut self,
        context: &str,
        html: &str,
        rewrite: F,
    ) -> Result<String, E>
    where
        F: FnOnce(&str) -> Result<String, E>,
    {
        let outcome = self.engine.guard_duplicates(context, html, rewrite)?;
        self.log.record_guard(context, &outcome);
        Ok(outcome.content)
    }

    pub fn log(&self) -> &RequestLog {
        &self.log
    }

    pub fn reset_log(&mut self) {
        self.log = RequestLog::default();
    }

    pub fn into_log(self) -> RequestLog {
        self.log
    }
}
