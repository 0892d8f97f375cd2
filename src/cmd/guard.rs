//! Duplicate guard command.

use anyhow::{Context, Result};
use std::path::Path;

use myls::config::Config;

use super::open_engine;

/// Print the final content for `file`. When it is a near-duplicate, the
/// content of `rewrite_file` replaces it; with no rewrite file the original
/// is kept and only the history is updated.
pub fn cmd_guard(
    state_dir: Option<&Path>,
    context: &str,
    file: &Path,
    rewrite_file: Option<&Path>,
    report: bool,
) -> Result<()> {
    let config = Config::load(state_dir)?;
    let engine = open_engine(&config)?;

    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let outcome = engine.guard_duplicates(context, &html, |_original| match rewrite_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rewrite file {}", path.display())),
        None => Ok(String::new()),
    })?;

    print!("{}", outcome.content);
    if report {
        eprintln!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(())
}
