//! Best-effort markup removal. Malformed HTML never fails; unmatched `<` is kept.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_STYLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap());

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Remove markup, including the bodies of `<script>` and `<style>` elements.
///
/// Tags are removed without inserting whitespace and the result is trimmed,
/// so `<p>A</p><p>B</p>` becomes `AB`.
pub fn strip_tags(html: &str) -> String {
    let without_code = SCRIPT_STYLE_REGEX.replace_all(html, "");
    TAG_REGEX.replace_all(&without_code, "").trim().to_string()
}

/// Visible text for counting: tags become word breaks, common entities are
/// decoded, and whitespace is collapsed to single spaces.
pub fn visible_text(html: &str) -> String {
    let without_code = SCRIPT_STYLE_REGEX.replace_all(html, " ");
    let without_tags = TAG_REGEX.replace_all(&without_code, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&rsquo;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags_removes_markup() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("<p>A</p><p>B</p>"), "AB");
    }

    #[test]
    fn test_strip_tags_drops_script_and_style_bodies() {
        let html = "<style>p{color:red}</style><p>Text</p><script>alert(1)</script>";
        assert_eq!(strip_tags(html), "Text");
    }

    #[test]
    fn test_strip_tags_tolerates_malformed_html() {
        assert_eq!(
            strip_tags("<p>Open paragraph <em>never closed"),
            "Open paragraph never closed"
        );
        assert_eq!(strip_tags("a < b"), "a < b");
    }

    #[test]
    fn test_visible_text_separates_blocks() {
        assert_eq!(visible_text("<p>One</p><p>Two</p>"), "One Two");
    }

    #[test]
    fn test_visible_text_decodes_entities() {
        assert_eq!(visible_text("<p>Tom&nbsp;&amp;&nbsp;Jerry</p>"), "Tom & Jerry");
    }

    #[test]
    fn test_visible_text_empty() {
        assert_eq!(visible_text(""), "");
        assert_eq!(visible_text("<br/>  <hr>"), "");
    }
}
