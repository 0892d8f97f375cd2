//! Content Quality Analyzer
//!
//! Pure measurements over finished HTML, used for per-item reporting in a
//! batch run. Nothing here touches the store.
//!
//! - **Structure**: words, characters, paragraphs, headings, lists, links
//! - **Sentences**: count, average length, first-sentence excerpt
//! - **Templating signals**: stock opener in the first 80 characters,
//!   location mentions, focus-keyword density
//! - **Readability**: approximate Flesch–Kincaid grade
//! - **Cost**: token and USD estimate from character counts

mod cost;
mod metrics;
mod readability;

pub use cost::{
    CHARS_PER_TOKEN, CostEstimate, DEFAULT_PRICING_MODEL, ModelPrice, PriceTable, estimate_cost,
    estimate_tokens,
};
pub use metrics::{
    AnalyzeOptions, EstimateSummary, FIRST_SENTENCE_CHARS, OPENER_WINDOW_CHARS, QualityMetrics,
    STOCK_OPENERS, analyze, analyze_with_prices, count_location_mentions, detect_stock_opener,
    split_sentences,
};
pub use readability::{count_syllables, flesch_kincaid_grade, total_syllables};
