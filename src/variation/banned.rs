//! Per-context banned phrases.
//!
//! Phrases are handed to the model verbatim inside the prompt. Nothing here
//! scans generated output for them.

use std::collections::HashMap;

const BUILTIN_BANNED: &[(&str, &[&str])] = &[
    (
        "about_the_area",
        &[
            "nestled in",
            "hidden gem",
            "vibrant community",
            "rich history",
            "something for everyone",
            "look no further",
            "whether you're a",
            "boasts a",
            "a perfect blend of",
            "small-town charm",
        ],
    ),
    ("meta_title", &["#1", "best in town", "top-rated", "near me"]),
    (
        "meta_description",
        &[
            "look no further",
            "we've got you covered",
            "your one-stop shop",
            "second to none",
            "click here",
        ],
    ),
    (
        "service_area_intro",
        &[
            "look no further",
            "proudly serving",
            "we are proud to",
            "your trusted partner",
            "nestled in",
            "one-stop shop",
        ],
    ),
    (
        "service_description",
        &[
            "state-of-the-art",
            "cutting-edge",
            "top-notch",
            "second to none",
            "we pride ourselves",
        ],
    ),
    (
        "faq_answer",
        &["great question", "at the end of the day", "it's important to note"],
    ),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BannedPhrases {
    lists: HashMap<String, Vec<String>>,
}

impl BannedPhrases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut banned = Self::new();
        for (context, phrases) in BUILTIN_BANNED {
            banned.insert(context, phrases.iter().map(|p| p.to_string()).collect());
        }
        banned
    }

    /// Replace the list for `context`. Duplicate phrases are dropped, first one kept.
    pub fn insert(&mut self, context: &str, phrases: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            if !unique.contains(&phrase) {
                unique.push(phrase);
            }
        }
        self.lists.insert(context.to_string(), unique);
    }

    /// Phrases for `context`; empty when none are configured.
    pub fn get(&self, context: &str) -> &[String] {
        self.lists.get(context).map(Vec::as_slice).unwrap_or(&[])
    }
}
