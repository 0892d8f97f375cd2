//! Fingerprinting and character-level similarity.
//!
//! Similarity is the classic `similar_text` percentage: find the longest
//! common run of characters (first one wins on ties), recurse on the pieces
//! left and right of it, and report `2 * matched / (len(a) + len(b)) * 100`.

use crate::html::strip_tags;

/// The first `max_chars` characters of the tag-stripped text.
pub fn fingerprint(html: &str, max_chars: usize) -> String {
    strip_tags(html).chars().take(max_chars).collect()
}

/// Percentage similarity in `0.0..=100.0`. Two empty strings score 0.
pub fn similarity_percent(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    (common_chars(&a, &b) * 2) as f64 * 100.0 / total as f64
}

/// Number of characters matched by recursive longest-common-run decomposition.
pub fn common_chars(a: &[char], b: &[char]) -> usize {
    let (pos_a, pos_b, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }
    len + common_chars(&a[..pos_a], &b[..pos_b])
        + common_chars(&a[pos_a + len..], &b[pos_b + len..])
}

/// Start positions and length of the first longest common run.
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    for i in 0..a.len() {
        // No run starting here or later can beat the current best.
        if a.len() - i <= best.2 {
            break;
        }
        for j in 0..b.len() {
            let mut k = 0;
            while i + k < a.len() && j + k < b.len() && a[i + k] == b[j + k] {
                k += 1;
            }
            if k > best.2 {
                best = (i, j, k);
            }
        }
    }
    best
}

/// Result of comparing one fingerprint against a history window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryScan {
    /// Highest score seen before the scan stopped.
    pub max_similarity: f64,
    /// Index of the entry that produced `max_similarity`.
    pub match_index: Option<usize>,
    /// Whether some entry scored strictly above the threshold.
    pub exceeded: bool,
}

/// Compare `candidate` against `history` in order, stopping at the first entry
/// scoring strictly above `threshold`.
///
/// Because the scan stops early, `max_similarity` is the maximum over the
/// entries actually visited; a later entry could have scored higher.
pub fn scan_history(history: &[String], candidate: &str, threshold: f64) -> HistoryScan {
    let mut scan = HistoryScan {
        max_similarity: 0.0,
        match_index: None,
        exceeded: false,
    };
    for (index, prior) in history.iter().enumerate() {
        let score = similarity_percent(prior, candidate);
        if score > scan.max_similarity {
            scan.max_similarity = score;
            scan.match_index = Some(index);
        }
        if score > threshold {
            scan.exceeded = true;
            break;
        }
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_truncates_on_chars() {
        let html = format!("<p>{}</p>", "é".repeat(400));
        let fp = fingerprint(&html, 300);
        assert_eq!(fp.chars().count(), 300);
    }

    #[test]
    fn test_identical_strings_score_100() {
        assert_eq!(similarity_percent("Tampa Bay", "Tampa Bay"), 100.0);
    }

    #[test]
    fn test_disjoint_strings_score_0() {
        assert_eq!(similarity_percent("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_empty_strings_score_0() {
        assert_eq!(similarity_percent("", ""), 0.0);
        assert_eq!(similarity_percent("abc", ""), 0.0);
    }

    #[test]
    fn test_known_similar_text_values() {
        // "World" vs "Word": longest run "Wor", then "l"/"" and "d"/"d" -> 4 matched.
        let score = similarity_percent("World", "Word");
        assert!((score - 88.888_888).abs() < 1e-3);
        assert_eq!(common_chars(&['a', 'b', 'c'], &['c', 'a', 'b']), 2);
    }

    #[test]
    fn test_scan_empty_history() {
        let scan = scan_history(&[], "anything", 60.0);
        assert_eq!(scan.max_similarity, 0.0);
        assert_eq!(scan.match_index, None);
        assert!(!scan.exceeded);
    }

    #[test]
    fn test_scan_stops_at_first_exceedance() {
        let candidate = "abcdefghij";
        let history = vec![
            "zzzzzzzzzz".to_string(),
            "abcdefgxyz".to_string(), // 70%
            "abcdefghij".to_string(), // 100%, never visited
        ];
        let scan = scan_history(&history, candidate, 60.0);
        assert!(scan.exceeded);
        assert_eq!(scan.match_index, Some(1));
        assert!((scan.max_similarity - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_scan_threshold_is_strict() {
        let history = vec!["abcdefghij".to_string()];
        // 6 of 10 characters shared -> exactly 60%.
        let scan = scan_history(&history, "abcdefqrst", 60.0);
        assert!((scan.max_similarity - 60.0).abs() < 1e-9);
        assert!(!scan.exceeded);
    }
}
