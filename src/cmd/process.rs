//! Single-item pipeline command.

use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Write;
use std::path::Path;

use myls::config::Config;
use myls::report::{ItemLogInput, build_item_log_with_prices};

use super::open_engine;

pub struct ProcessArgs<'a> {
    pub context: &'a str,
    pub html_file: &'a Path,
    pub item: Option<&'a str>,
    pub prompt_file: Option<&'a Path>,
    pub model: Option<&'a str>,
    pub city_state: Option<&'a str>,
    pub keyword: Option<&'a str>,
    pub log_file: Option<&'a Path>,
}

/// Rotate an angle, inject it into the prompt, guard the generated HTML and
/// emit the item log. The HTML stands in for the model's output, so a
/// near-duplicate is recorded but never rewritten.
pub fn cmd_process(state_dir: Option<&Path>, args: ProcessArgs<'_>) -> Result<()> {
    let config = Config::load(state_dir)?;
    let engine = open_engine(&config)?;
    let prices = config.toml.price_table();
    let started_at = Utc::now();

    let base_prompt = match args.prompt_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => String::new(),
    };
    let html = std::fs::read_to_string(args.html_file)
        .with_context(|| format!("Failed to read {}", args.html_file.display()))?;

    let mut session = engine.session();
    let angle = session.next_angle(args.context);
    let prompt = session.inject_variation(&base_prompt, &angle, args.context);
    let content = session.guard_duplicates(args.context, &html, |_| {
        Ok::<_, anyhow::Error>(String::new())
    })?;
    let finished_at = Utc::now();

    let item = match args.item {
        Some(item) => item.to_string(),
        None => args
            .html_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let model = args.model.unwrap_or(prices.default_model());

    let input = ItemLogInput {
        item: &item,
        started_at,
        finished_at,
        model,
        prompt_chars: prompt.chars().count(),
        output_chars: content.chars().count(),
        html: Some(&content),
        city_state: args.city_state,
        focus_keyword: args.keyword,
    };
    let line = build_item_log_with_prices(&input, session.log(), &prices).to_json_line()?;

    match args.log_file {
        Some(path) => {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            writeln!(file, "{}", line)
                .with_context(|| format!("Failed to write log file {}", path.display()))?;
        }
        None => println!("{}", line),
    }
    Ok(())
}
