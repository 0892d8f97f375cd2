//! Token and USD cost estimates from character counts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model used for pricing when the requested one is not in the table.
pub const DEFAULT_PRICING_MODEL: &str = "gpt-4o-mini";

/// Rough characters-per-token ratio for English prose.
pub const CHARS_PER_TOKEN: usize = 4;

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    pub input: f64,
    pub output: f64,
}

const BUILTIN_PRICES: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.15, 0.60),
    ("gpt-4o", 2.50, 10.00),
    ("gpt-4.1", 2.00, 8.00),
    ("gpt-4.1-mini", 0.40, 1.60),
    ("gpt-4.1-nano", 0.10, 0.40),
    ("gpt-4-turbo", 10.00, 30.00),
    ("gpt-3.5-turbo", 0.50, 1.50),
    ("o3-mini", 1.10, 4.40),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub model: String,
    /// Table entry actually used; differs from `model` on fallback.
    pub priced_as: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub est_cost_usd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    default_model: String,
    models: BTreeMap<String, ModelPrice>,
}

impl PriceTable {
    pub fn builtin() -> Self {
        let models = BUILTIN_PRICES
            .iter()
            .map(|(name, input, output)| {
                (
                    name.to_string(),
                    ModelPrice {
                        input: *input,
                        output: *output,
                    },
                )
            })
            .collect();
        Self {
            default_model: DEFAULT_PRICING_MODEL.to_string(),
            models,
        }
    }

    /// Add or replace a model's rates. Names are matched case-insensitively.
    pub fn insert(&mut self, model: &str, price: ModelPrice) {
        self.models.insert(model.to_lowercase(), price);
    }

    /// Change the fallback model. Ignored when the table has no such entry.
    pub fn set_default_model(&mut self, model: &str) -> bool {
        let key = model.to_lowercase();
        if self.models.contains_key(&key) {
            self.default_model = key;
            true
        } else {
            false
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn models(&self) -> impl Iterator<Item = (&str, &ModelPrice)> {
        self.models.iter().map(|(name, price)| (name.as_str(), price))
    }

    /// Rates for `model`, or the default model's rates. Returns the entry name used.
    pub fn lookup(&self, model: &str) -> (&str, ModelPrice) {
        let key = model.trim().to_lowercase();
        if let Some((name, price)) = self.models.get_key_value(&key) {
            return (name.as_str(), *price);
        }
        let price = self
            .models
            .get(&self.default_model)
            .copied()
            .unwrap_or(ModelPrice {
                input: 0.0,
                output: 0.0,
            });
        (self.default_model.as_str(), price)
    }

    pub fn estimate(&self, model: &str, prompt_chars: usize, output_chars: usize) -> CostEstimate {
        let (priced_as, price) = self.lookup(model);
        let input_tokens = estimate_tokens(prompt_chars);
        let output_tokens = estimate_tokens(output_chars);
        let cost = (input_tokens as f64 / 1_000_000.0) * price.input
            + (output_tokens as f64 / 1_000_000.0) * price.output;
        CostEstimate {
            model: model.to_string(),
            priced_as: priced_as.to_string(),
            input_tokens,
            output_tokens,
            est_cost_usd: round_to(cost, 6),
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// `ceil(chars / 4)`.
pub fn estimate_tokens(chars: usize) -> u64 {
    chars.div_ceil(CHARS_PER_TOKEN) as u64
}

/// Estimate against the built-in price table.
pub fn estimate_cost(model: &str, prompt_chars: usize, output_chars: usize) -> CostEstimate {
    PriceTable::builtin().estimate(model, prompt_chars, output_chars)
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
