//! Flat per-item audit records for batch runs.
//!
//! An [`ItemLog`] merges everything known about one generated item into a
//! single JSON object: timing, model and cost estimate, what the variation
//! engine did, and quality metrics when the final HTML is available.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::quality::{AnalyzeOptions, PriceTable, QualityMetrics, analyze_with_prices};
use crate::variation::RequestLog;

/// Inputs for one item's log entry.
#[derive(Debug, Clone)]
pub struct ItemLogInput<'a> {
    /// Caller's label for the item (page title, city, post id).
    pub item: &'a str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub model: &'a str,
    pub prompt_chars: usize,
    pub output_chars: usize,
    /// Final HTML; quality metrics are included only when present.
    pub html: Option<&'a str>,
    pub city_state: Option<&'a str>,
    pub focus_keyword: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemLog {
    pub item: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub model: String,
    pub priced_as: String,
    pub prompt_chars: usize,
    pub output_chars: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub est_cost_usd: f64,
    #[serde(flatten)]
    pub engine: RequestLog,
    /// `"none"` when no stock opener matched or no HTML was given.
    pub opener_match: String,
    #[serde(flatten)]
    pub quality: Option<QualityMetrics>,
}

impl ItemLog {
    /// Single-line JSON for appending to a log file.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Build an item log priced with the built-in table.
pub fn build_item_log(input: &ItemLogInput<'_>, engine_log: &RequestLog) -> ItemLog {
    build_item_log_with_prices(input, engine_log, &PriceTable::builtin())
}

pub fn build_item_log_with_prices(
    input: &ItemLogInput<'_>,
    engine_log: &RequestLog,
    prices: &PriceTable,
) -> ItemLog {
    let estimate = prices.estimate(input.model, input.prompt_chars, input.output_chars);

    let quality = input.html.map(|html| {
        let options = AnalyzeOptions {
            city_state: input.city_state.map(str::to_string),
            focus_keyword: input.focus_keyword.map(str::to_string),
            ..Default::default()
        };
        analyze_with_prices(html, &options, prices)
    });
    let opener_match = quality
        .as_ref()
        .map(|q| q.stock_opener_label().to_string())
        .unwrap_or_else(|| "none".to_string());

    ItemLog {
        item: input.item.to_string(),
        started_at: input.started_at,
        finished_at: input.finished_at,
        duration_ms: (input.finished_at - input.started_at).num_milliseconds(),
        model: estimate.model,
        priced_as: estimate.priced_as,
        prompt_chars: input.prompt_chars,
        output_chars: input.output_chars,
        input_tokens: estimate.input_tokens,
        output_tokens: estimate.output_tokens,
        est_cost_usd: estimate.est_cost_usd,
        engine: engine_log.clone(),
        opener_match,
        quality,
    }
}
