//! Content Variation Engine
//!
//! Keeps batched LLM copy for many near-identical pages (one per city or
//! service area) from reading like the same page with the names swapped.
//!
//! ## Pieces
//!
//! - **Angle rotation**: each context has an ordered pool of opening angles;
//!   every request takes the next one round-robin, with the counter kept in
//!   the store for an hour
//! - **Banned phrases**: per-context phrases the model is told never to use
//! - **Prompt augmentation**: a fixed instruction block appended to the
//!   caller's prompt
//! - **Duplicate guard**: the first 300 characters of each accepted output are
//!   remembered per context (last 50); new output scoring above 60% against
//!   any of them is sent back through a caller-supplied rewrite function
//!
//! ## Usage
//!
//! ```ignore
//! use myls::store::MemoryStore;
//! use myls::variation::VariationEngine;
//!
//! let engine = VariationEngine::with_defaults(MemoryStore::new());
//! let mut session = engine.session();
//!
//! let angle = session.next_angle("about_the_area");
//! let prompt = session.inject_variation(&draft, &angle, "about_the_area");
//! let html = llm.complete(&prompt)?;
//! let html = session.guard_duplicates("about_the_area", &html, |original| {
//!     llm.complete(&rewrite_prompt(original))
//! })?;
//! let log = session.into_log();
//! ```
//!
//! Rotation is global per context. Two batches running for the same context
//! at once interleave their angles, and both may accept outputs checked
//! against the same stale history.

mod angles;
mod banned;
mod config;
mod engine;
mod prompt;
mod session;
mod similarity;

pub use angles::{AnglePools, DEFAULT_CONTEXT, rotation_index};
pub use banned::BannedPhrases;
pub use config::VariationConfig;
pub use engine::{AngleSelection, GuardOutcome, VariationEngine};
pub use prompt::{GENERIC_ADJECTIVES, VARIATION_HEADER, build_variation_block};
pub use session::{RequestLog, VariationSession};
pub use similarity::{HistoryScan, common_chars, fingerprint, scan_history, similarity_percent};

use std::time::Duration;

/// Scores strictly above this percentage trigger a rewrite.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 60.0;

/// Fingerprints remembered per context.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Characters of tag-stripped text in a fingerprint.
pub const DEFAULT_FINGERPRINT_CHARS: usize = 300;

/// Lifetime of rotation counters and history.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(60 * 60);
