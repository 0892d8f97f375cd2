//! Configuration view and validation commands (`myls config`).

use anyhow::Result;
use std::path::Path;

use myls::config::{Config, MylsToml};

use super::super::ConfigCommands;

pub fn cmd_config(state_dir: Option<&Path>, command: Option<ConfigCommands>) -> Result<()> {
    let config = Config::load(state_dir)?;
    let config_path = &config.config_file;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("myls Configuration");
            println!("==================");
            println!();
            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No myls.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!("State file:  {}", config.state_file.display());
            println!();

            let toml = &config.toml;
            println!("[engine]");
            println!(
                "  similarity_threshold = {}",
                toml.engine.similarity_threshold
            );
            println!("  history_limit = {}", toml.engine.history_limit);
            println!("  fingerprint_chars = {}", toml.engine.fingerprint_chars);
            println!("  state_ttl_secs = {}", toml.engine.state_ttl_secs);
            println!("  default_context = \"{}\"", toml.engine.default_context);
            println!();

            let pools = toml.angle_pools();
            let banned = toml.banned_phrases();
            println!("Contexts:");
            for context in pools.contexts() {
                let source = if toml.angles.contains_key(context) {
                    "myls.toml"
                } else {
                    "built-in"
                };
                println!(
                    "  {:<22} {:>2} angles ({}), {:>2} banned phrases",
                    context,
                    pools.get(context).len(),
                    source,
                    banned.get(context).len()
                );
            }
            println!();

            let prices = toml.price_table();
            println!("[pricing] default_model = \"{}\"", prices.default_model());
            for (model, price) in prices.models() {
                println!(
                    "  {:<16} ${:.2} in / ${:.2} out per 1M tokens",
                    model, price.input, price.output
                );
            }
            println!();

            if !config_path.exists() {
                println!("Run 'myls config init' to create a myls.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No myls.toml found. Using defaults (valid).");
                return Ok(());
            }

            let warnings = config.toml.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }
            println!();

            config.toml.variation_config().validate()?;
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("myls.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config.state_dir.exists() {
                std::fs::create_dir_all(&config.state_dir)?;
            }

            MylsToml::default().save(config_path)?;

            println!("Created myls.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [engine] similarity_threshold, history_limit, state_ttl_secs");
            println!("  - [angles] and [banned] per-context lists");
            println!("  - [pricing.models.\"name\"] for extra model rates");
            println!();
        }
    }

    Ok(())
}
