//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module     | Commands handled                  |
//! |------------|-----------------------------------|
//! | `angle`    | `Angle`, `Banned`, `Clear`        |
//! | `prompt`   | `Inject`                          |
//! | `guard`    | `Guard`                           |
//! | `analyze`  | `Analyze`, `Cost`                 |
//! | `process`  | `Process`                         |
//! | `config`   | `Config`                          |

pub mod analyze;
pub mod angle;
pub mod config;
pub mod guard;
pub mod process;
pub mod prompt;

pub use analyze::{AnalyzeArgs, cmd_analyze, cmd_cost};
pub use angle::{cmd_angle, cmd_banned, cmd_clear};
pub use config::cmd_config;
pub use guard::cmd_guard;
pub use process::{ProcessArgs, cmd_process};
pub use prompt::cmd_inject;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use myls::config::Config;
use myls::store::FileStore;
use myls::variation::VariationEngine;

/// Engine over `<state-dir>/state.json`, configured from `myls.toml`.
pub fn open_engine(config: &Config) -> Result<VariationEngine<FileStore>> {
    let store = FileStore::new(&config.state_file);
    let engine = VariationEngine::new(store, config.toml.variation_config())
        .with_context(|| format!("Invalid configuration in {}", config.config_file.display()))?;
    Ok(engine)
}

/// Read a file, or stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
