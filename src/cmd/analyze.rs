//! Quality analysis and cost estimate commands.

use anyhow::{Context, Result};
use std::path::Path;

use myls::config::Config;
use myls::quality::{AnalyzeOptions, QualityMetrics, analyze_with_prices};

pub struct AnalyzeArgs {
    pub city_state: Option<String>,
    pub keyword: Option<String>,
    pub model: Option<String>,
    pub prompt_chars: usize,
    pub json: bool,
}

pub fn cmd_analyze(state_dir: Option<&Path>, file: &Path, args: AnalyzeArgs) -> Result<()> {
    let config = Config::load(state_dir)?;
    let prices = config.toml.price_table();

    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let options = AnalyzeOptions {
        city_state: args.city_state,
        focus_keyword: args.keyword,
        model: args.model,
        prompt_chars: args.prompt_chars,
    };
    let metrics = analyze_with_prices(&html, &options, &prices);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print_metrics(&metrics);
    }
    Ok(())
}

fn print_metrics(m: &QualityMetrics) {
    println!();
    println!("Content Quality");
    println!("===============");
    println!();
    println!("  words               {}", m.words);
    println!("  chars               {}", m.chars);
    println!("  paragraphs          {}", m.paragraphs);
    println!("  headings            {}", m.headings);
    println!("  lists               {} ({} items)", m.lists, m.list_items);
    println!("  links               {}", m.links);
    println!("  sentences           {}", m.sentences);
    println!("  avg sentence length {}", m.avg_sentence_length);
    println!("  readability grade   {}", m.readability_grade);
    println!("  stock opener        {}", m.stock_opener_label());
    println!("  location mentions   {}", m.location_mentions);
    if m.keyword_count > 0 || m.keyword_density > 0.0 {
        println!(
            "  keyword             {} ({}%)",
            m.keyword_count, m.keyword_density
        );
    }
    if let Some(cost) = &m.cost {
        println!(
            "  est. cost           ${:.6} ({} in / {} out tokens, {})",
            cost.est_cost_usd, cost.input_tokens, cost.output_tokens, cost.model
        );
    }
    println!();
    if !m.first_sentence.is_empty() {
        println!("First sentence: {}", m.first_sentence);
        println!();
    }
}

pub fn cmd_cost(
    state_dir: Option<&Path>,
    model: &str,
    prompt_chars: usize,
    output_chars: usize,
    json: bool,
) -> Result<()> {
    let config = Config::load(state_dir)?;
    let estimate = config
        .toml
        .price_table()
        .estimate(model, prompt_chars, output_chars);

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    if !estimate.model.trim().eq_ignore_ascii_case(&estimate.priced_as) {
        println!(
            "Unknown model '{}', priced as {}",
            estimate.model, estimate.priced_as
        );
    }
    println!("input tokens:  {}", estimate.input_tokens);
    println!("output tokens: {}", estimate.output_tokens);
    println!("est. cost:     ${:.6}", estimate.est_cost_usd);
    Ok(())
}
