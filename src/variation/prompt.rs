//! Anti-repetition instruction block appended to generation prompts.
//!
//! The block always has the same section order so that prompts are stable
//! across runs:
//!
//! 1. **OPENING ANGLE**: mandatory, names the selected angle
//! 2. **STRUCTURE**: rhythm and layout variation
//! 3. **BANNED PHRASES**: only when the context has any, each phrase quoted
//! 4. **WORD CHOICE**: generic adjectives and templated four-word phrases
//!
//! Sections are labelled rather than numbered, so a missing banned list does
//! not shift the others.

/// Header line that opens the appended block.
pub const VARIATION_HEADER: &str = "=== VARIATION REQUIREMENTS ===";

/// Adjectives that turn up in nearly every templated local page.
pub const GENERIC_ADJECTIVES: &[&str] = &[
    "vibrant",
    "bustling",
    "thriving",
    "charming",
    "picturesque",
    "stunning",
    "world-class",
    "premier",
    "unparalleled",
    "seamless",
];

/// Append the variation block to `base_prompt`.
pub fn build_variation_block(base_prompt: &str, angle: &str, banned: &[String]) -> String {
    let mut prompt = String::with_capacity(base_prompt.len() + 1024);
    prompt.push_str(base_prompt.trim_end());
    prompt.push_str("\n\n");
    prompt.push_str(VARIATION_HEADER);
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "OPENING ANGLE (mandatory): Open with the \"{}\" angle. The first sentence must \
         follow this angle. Do not open with a generic welcome or by restating the \
         location name.\n\n",
        angle
    ));

    prompt.push_str("STRUCTURE:\n");
    prompt.push_str("- Vary sentence length. Mix short sentences with longer ones.\n");
    prompt.push_str(
        "- Vary paragraph length and rhythm. Do not give every paragraph the same shape.\n",
    );
    prompt.push_str(
        "- Do not reuse the sentence patterns, paragraph order, or transitions used for \
         other pages in this batch.\n\n",
    );

    if !banned.is_empty() {
        prompt.push_str("BANNED PHRASES (never use these, in any capitalization):\n");
        for phrase in banned {
            prompt.push_str(&format!("- \"{}\"\n", phrase));
        }
        prompt.push('\n');
    }

    prompt.push_str("WORD CHOICE:\n");
    prompt.push_str(&format!(
        "- Avoid generic adjectives: {}.\n",
        GENERIC_ADJECTIVES.join(", ")
    ));
    prompt.push_str(
        "- Do not repeat any phrase of four or more words that reads like templated \
         local-business copy, such as stock service-area lines, boilerplate calls to \
         action, or interchangeable city introductions.\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banned() -> Vec<String> {
        vec!["nestled in".to_string(), "hidden gem".to_string()]
    }

    #[test]
    fn test_contains_base_and_angle() {
        let out = build_variation_block("Write about Tampa.", "history_first", &banned());
        assert!(out.starts_with("Write about Tampa."));
        assert!(out.contains("\"history_first\""));
        assert!(out.contains(VARIATION_HEADER));
    }

    #[test]
    fn test_each_banned_phrase_quoted_once() {
        let out = build_variation_block("Prompt", "landmark_anchor", &banned());
        for phrase in banned() {
            assert_eq!(out.matches(&format!("\"{}\"", phrase)).count(), 1);
        }
    }

    #[test]
    fn test_section_order_is_fixed() {
        let out = build_variation_block("Prompt", "a", &banned());
        let opening = out.find("OPENING ANGLE").unwrap();
        let structure = out.find("STRUCTURE:").unwrap();
        let phrases = out.find("BANNED PHRASES").unwrap();
        let words = out.find("WORD CHOICE:").unwrap();
        assert!(opening < structure);
        assert!(structure < phrases);
        assert!(phrases < words);
    }

    #[test]
    fn test_no_banned_section_without_phrases() {
        let out = build_variation_block("Prompt", "a", &[]);
        assert!(!out.contains("BANNED PHRASES"));
        assert!(out.contains("OPENING ANGLE"));
        assert!(out.contains("STRUCTURE:"));
        assert!(out.contains("WORD CHOICE:"));
    }

    #[test]
    fn test_word_choice_lists_adjectives_and_four_word_rule() {
        let out = build_variation_block("Prompt", "a", &[]);
        for adjective in GENERIC_ADJECTIVES {
            assert!(out.contains(adjective));
        }
        assert!(out.contains("four or more words"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let a = build_variation_block("Prompt", "angle", &banned());
        let b = build_variation_block("Prompt", "angle", &banned());
        assert_eq!(a, b);
    }
}
