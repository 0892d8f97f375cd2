//! Angle rotation and banned-phrase commands.

use anyhow::{Result, bail};
use std::path::Path;

use myls::config::Config;

use super::super::AngleCommands;
use super::open_engine;

pub fn cmd_angle(state_dir: Option<&Path>, command: &AngleCommands) -> Result<()> {
    let config = Config::load(state_dir)?;
    let engine = open_engine(&config)?;

    match command {
        AngleCommands::Next { context, json } => {
            let selection = engine.next_angle(context);
            if *json {
                println!("{}", serde_json::to_string_pretty(&selection)?);
            } else {
                println!("{}", selection.angle);
            }
        }
        AngleCommands::Reset { context } => {
            if !engine.reset_angle(context) {
                bail!(
                    "Could not reset '{}': {} was not updated",
                    context,
                    config.state_file.display()
                );
            }
            println!("Reset angle rotation for '{}'", context);
        }
        AngleCommands::List { context: Some(context) } => {
            let pool = engine.get_angles(context);
            if pool.is_empty() {
                let (fallback, pool) = engine.config().angles.resolve(context);
                println!("No pool for '{}'; rotation uses '{}':", context, fallback);
                print_pool(pool);
            } else {
                print_pool(pool);
            }
        }
        AngleCommands::List { context: None } => {
            let angles = &engine.config().angles;
            for name in angles.contexts() {
                let marker = if name == angles.default_context() {
                    " (default)"
                } else {
                    ""
                };
                println!("{}{}:", name, marker);
                print_pool(angles.get(name));
                println!();
            }
        }
    }

    Ok(())
}

fn print_pool(pool: &[String]) {
    for (i, angle) in pool.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, angle);
    }
}

pub fn cmd_banned(state_dir: Option<&Path>, context: &str) -> Result<()> {
    let config = Config::load(state_dir)?;
    let engine = open_engine(&config)?;

    let phrases = engine.get_banned_phrases(context);
    if phrases.is_empty() {
        println!("No banned phrases for '{}'", context);
    }
    for phrase in phrases {
        println!("{}", phrase);
    }
    Ok(())
}

pub fn cmd_clear(state_dir: Option<&Path>, context: &str) -> Result<()> {
    let config = Config::load(state_dir)?;
    let engine = open_engine(&config)?;

    if !engine.clear_batch(context) {
        bail!(
            "Could not clear '{}': {} was not updated",
            context,
            config.state_file.display()
        );
    }
    println!("Cleared rotation and duplicate history for '{}'", context);
    Ok(())
}
