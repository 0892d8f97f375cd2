//! Structural and statistical metrics over a finished HTML fragment.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::cost::{CostEstimate, PriceTable, round_to};
use super::readability::{flesch_kincaid_grade, total_syllables};
use crate::html::visible_text;

static PARAGRAPH_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<p[\s>]").unwrap());

static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[1-6][\s>]").unwrap());

static LIST_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<(ul|ol)[\s>]").unwrap());

static LIST_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li[\s>]").unwrap());

static LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a\s[^>]*\bhref\s*=").unwrap());

static SENTENCE_END_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Openers that mark templated copy, checked in order; the first hit wins.
pub const STOCK_OPENERS: &[&str] = &[
    "welcome to",
    "are you looking for",
    "looking for",
    "if you're looking",
    "when it comes to",
    "in today's",
    "nestled in",
    "located in",
    "whether you're",
    "there's no better",
    "have you ever",
    "as a leading",
    "we are proud",
    "did you know",
];

/// Characters of lower-cased text searched for a stock opener.
pub const OPENER_WINDOW_CHARS: usize = 80;

/// Longest first-sentence excerpt kept, in characters.
pub const FIRST_SENTENCE_CHARS: usize = 150;

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// e.g. `"Tampa, FL"`.
    pub city_state: Option<String>,
    pub focus_keyword: Option<String>,
    /// When set, `cost` is filled in for this model.
    pub model: Option<String>,
    /// Prompt size used for the cost estimate.
    pub prompt_chars: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub words: usize,
    pub chars: usize,
    pub paragraphs: usize,
    pub headings: usize,
    pub lists: usize,
    pub list_items: usize,
    pub links: usize,
    pub sentences: usize,
    pub avg_sentence_length: f64,
    pub first_sentence: String,
    pub stock_opener: Option<String>,
    pub location_mentions: usize,
    pub keyword_count: usize,
    pub keyword_density: f64,
    pub readability_grade: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<EstimateSummary>,
}

/// Cost fields carried inside [`QualityMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateSummary {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub est_cost_usd: f64,
}

impl From<CostEstimate> for EstimateSummary {
    fn from(estimate: CostEstimate) -> Self {
        Self {
            model: estimate.model,
            input_tokens: estimate.input_tokens,
            output_tokens: estimate.output_tokens,
            est_cost_usd: estimate.est_cost_usd,
        }
    }
}

impl QualityMetrics {
    /// The matched opener, or `"none"`.
    pub fn stock_opener_label(&self) -> &str {
        self.stock_opener.as_deref().unwrap_or("none")
    }
}

/// Analyze with the built-in price table.
pub fn analyze(html: &str, options: &AnalyzeOptions) -> QualityMetrics {
    analyze_with_prices(html, options, &PriceTable::builtin())
}

pub fn analyze_with_prices(
    html: &str,
    options: &AnalyzeOptions,
    prices: &PriceTable,
) -> QualityMetrics {
    let text = visible_text(html);
    let words = text.split_whitespace().count();
    let sentence_list = split_sentences(&text);
    let sentences = sentence_list.len();

    let avg_sentence_length = if sentences > 0 {
        round_to(words as f64 / sentences as f64, 1)
    } else {
        0.0
    };

    let first_sentence = sentence_list
        .first()
        .map(|s| s.chars().take(FIRST_SENTENCE_CHARS).collect())
        .unwrap_or_default();

    let lower = text.to_lowercase();
    let (keyword_count, keyword_density) =
        keyword_stats(&lower, words, options.focus_keyword.as_deref());

    QualityMetrics {
        words,
        chars: text.chars().count(),
        paragraphs: PARAGRAPH_REGEX.find_iter(html).count(),
        headings: HEADING_REGEX.find_iter(html).count(),
        lists: LIST_REGEX.find_iter(html).count(),
        list_items: LIST_ITEM_REGEX.find_iter(html).count(),
        links: LINK_REGEX.find_iter(html).count(),
        sentences,
        avg_sentence_length,
        first_sentence,
        stock_opener: detect_stock_opener(&lower).map(str::to_string),
        location_mentions: options
            .city_state
            .as_deref()
            .map(|cs| count_location_mentions(&lower, cs))
            .unwrap_or(0),
        keyword_count,
        keyword_density,
        readability_grade: flesch_kincaid_grade(words, sentences, total_syllables(&text)),
        cost: options.model.as_deref().map(|model| {
            prices
                .estimate(model, options.prompt_chars, html.chars().count())
                .into()
        }),
    }
}

/// Non-empty sentences, split on runs of `.`, `!` and `?`.
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_END_REGEX
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// First entry of [`STOCK_OPENERS`] inside the opening window of `lower`.
pub fn detect_stock_opener(lower: &str) -> Option<&'static str> {
    let window: String = lower.chars().take(OPENER_WINDOW_CHARS).collect();
    STOCK_OPENERS
        .iter()
        .find(|opener| window.contains(*opener))
        .copied()
}

/// The larger of the full-phrase count and the city-token count.
///
/// The city token is the first comma- or space-delimited piece of
/// `city_state`, counted only when longer than two characters.
pub fn count_location_mentions(lower: &str, city_state: &str) -> usize {
    let full = city_state.trim().to_lowercase();
    if full.is_empty() {
        return 0;
    }
    let full_count = lower.matches(full.as_str()).count();

    let token_count = full
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|t| !t.is_empty())
        .filter(|t| t.chars().count() > 2)
        .map(|t| lower.matches(t).count())
        .unwrap_or(0);

    full_count.max(token_count)
}

fn keyword_stats(lower: &str, total_words: usize, keyword: Option<&str>) -> (usize, f64) {
    let Some(keyword) = keyword.map(|k| k.trim().to_lowercase()).filter(|k| !k.is_empty()) else {
        return (0, 0.0);
    };
    let occurrences = lower.matches(keyword.as_str()).count();
    if total_words == 0 {
        return (occurrences, 0.0);
    }
    let keyword_words = keyword.split_whitespace().count();
    let density = (occurrences * keyword_words) as f64 / total_words as f64 * 100.0;
    (occurrences, round_to(density, 2))
}
