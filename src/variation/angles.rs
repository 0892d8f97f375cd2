//! Opening-angle pools and round-robin selection.

use std::collections::HashMap;

/// Context whose pool serves every context without one of its own.
pub const DEFAULT_CONTEXT: &str = "about_the_area";

const BUILTIN_POOLS: &[(&str, &[&str])] = &[
    (
        "about_the_area",
        &[
            "history_first",
            "landmark_anchor",
            "resident_day_in_the_life",
            "seasonal_climate",
            "neighborhood_contrast",
            "local_economy",
            "outdoor_recreation",
            "commute_and_access",
            "food_and_culture",
            "growth_and_change",
        ],
    ),
    (
        "meta_title",
        &[
            "service_then_city",
            "city_then_service",
            "benefit_led",
            "question_form",
            "brand_led",
        ],
    ),
    (
        "meta_description",
        &[
            "problem_solution",
            "benefit_stack",
            "local_proof",
            "call_to_action_first",
            "question_hook",
        ],
    ),
    (
        "service_area_intro",
        &[
            "customer_scenario",
            "local_challenge",
            "service_promise",
            "neighborhood_detail",
            "seasonal_need",
            "fast_fact",
        ],
    ),
    (
        "service_description",
        &[
            "outcome_first",
            "process_walkthrough",
            "pain_point",
            "credential_led",
            "comparison",
        ],
    ),
    (
        "faq_answer",
        &[
            "direct_answer",
            "short_explanation",
            "example_led",
            "myth_correction",
        ],
    ),
];

/// Angle pools keyed by context name.
#[derive(Debug, Clone, PartialEq)]
pub struct AnglePools {
    pools: HashMap<String, Vec<String>>,
    default_context: String,
}

impl AnglePools {
    /// An empty table whose fallback is `default_context`.
    pub fn new(default_context: &str) -> Self {
        Self {
            pools: HashMap::new(),
            default_context: default_context.to_string(),
        }
    }

    /// The pools shipped with the crate.
    pub fn builtin() -> Self {
        let mut pools = Self::new(DEFAULT_CONTEXT);
        for (context, angles) in BUILTIN_POOLS {
            pools.insert(context, angles.iter().map(|a| a.to_string()).collect());
        }
        pools
    }

    /// Replace the pool for `context`.
    pub fn insert(&mut self, context: &str, pool: Vec<String>) {
        self.pools.insert(context.to_string(), pool);
    }

    pub fn set_default_context(&mut self, context: &str) {
        self.default_context = context.to_string();
    }

    pub fn default_context(&self) -> &str {
        &self.default_context
    }

    /// The pool configured for exactly `context`; empty when there is none.
    pub fn get(&self, context: &str) -> &[String] {
        self.pools.get(context).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The pool used for rotation: the context's own pool if it has one,
    /// otherwise the default context's. Returns the context the pool belongs to.
    pub fn resolve<'a>(&'a self, context: &'a str) -> (&'a str, &'a [String]) {
        let own = self.get(context);
        if own.is_empty() {
            (self.default_context.as_str(), self.get(&self.default_context))
        } else {
            (context, own)
        }
    }

    /// Configured context names, sorted.
    pub fn contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AnglePools {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Index into a pool of `pool_len` entries for a rotation counter.
pub fn rotation_index(counter: u64, pool_len: usize) -> usize {
    if pool_len == 0 {
        return 0;
    }
    (counter % pool_len as u64) as usize
}
