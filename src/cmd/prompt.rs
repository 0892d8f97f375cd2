//! Prompt injection command.

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use myls::config::Config;

use super::{open_engine, read_input};

pub fn cmd_inject(
    state_dir: Option<&Path>,
    context: &str,
    angle: Option<&str>,
    prompt_file: Option<&Path>,
) -> Result<()> {
    let config = Config::load(state_dir)?;
    let engine = open_engine(&config)?;

    let base_prompt = read_input(prompt_file)?;
    let angle = match angle {
        Some(angle) => angle.to_string(),
        None => {
            let selection = engine.next_angle(context);
            debug!(angle = %selection.angle, index = selection.index, "no --angle given, rotated");
            selection.angle
        }
    };

    print!("{}", engine.inject_variation(&base_prompt, &angle, context));
    Ok(())
}
