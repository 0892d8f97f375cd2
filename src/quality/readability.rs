//! Syllable estimate and Flesch–Kincaid grade level.

/// Vowel-group syllable count for one word, never less than 1.
///
/// Non-letters are ignored. A trailing silent `e` is dropped unless the word
/// ends in `le` or has only one vowel group.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut groups = 0;
    let mut in_group = false;
    for &c in &letters {
        if is_vowel(c) {
            if !in_group {
                groups += 1;
            }
            in_group = true;
        } else {
            in_group = false;
        }
    }

    let n = letters.len();
    let silent_e = letters[n - 1] == 'e' && !(n >= 2 && letters[n - 2] == 'l');
    if silent_e && groups > 1 {
        groups -= 1;
    }
    groups.max(1)
}

/// Syllables across whitespace-separated words.
pub fn total_syllables(text: &str) -> usize {
    text.split_whitespace().map(count_syllables).sum()
}

/// Flesch–Kincaid grade, one decimal, floored at 0. Zero without words or sentences.
pub fn flesch_kincaid_grade(words: usize, sentences: usize, syllables: usize) -> f64 {
    if words == 0 || sentences == 0 {
        return 0.0;
    }
    let words_per_sentence = words as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words as f64;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;
    ((grade * 10.0).round() / 10.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_syllable_words() {
        assert_eq!(count_syllables("sun"), 1);
        assert_eq!(count_syllables("great"), 1);
        assert_eq!(count_syllables("the"), 1);
    }

    #[test]
    fn test_silent_e_dropped() {
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("locate"), 2);
    }

    #[test]
    fn test_le_ending_kept() {
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("people"), 2);
    }

    #[test]
    fn test_multi_syllable_words() {
        assert_eq!(count_syllables("Tampa"), 2);
        assert_eq!(count_syllables("community"), 4);
    }

    #[test]
    fn test_minimum_one() {
        assert_eq!(count_syllables("FL"), 1);
        assert_eq!(count_syllables("2024"), 1);
        assert_eq!(count_syllables(""), 1);
    }

    #[test]
    fn test_punctuation_ignored() {
        assert_eq!(count_syllables("Tampa,"), 2);
        assert_eq!(count_syllables("sun."), 1);
    }

    #[test]
    fn test_grade_zero_for_empty() {
        assert_eq!(flesch_kincaid_grade(0, 0, 0), 0.0);
        assert_eq!(flesch_kincaid_grade(5, 0, 7), 0.0);
    }

    #[test]
    fn test_grade_formula() {
        // 20 words, 2 sentences, 30 syllables:
        // 0.39 * 10 + 11.8 * 1.5 - 15.59 = 6.01 -> 6.0
        assert_eq!(flesch_kincaid_grade(20, 2, 30), 6.0);
    }

    #[test]
    fn test_grade_floored_at_zero() {
        assert_eq!(flesch_kincaid_grade(4, 4, 4), 0.0);
    }

    #[test]
    fn test_total_syllables() {
        assert_eq!(total_syllables("Tampa has sun."), 4);
    }
}
