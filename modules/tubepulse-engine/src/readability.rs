//! Flesch-Kincaid readability metrics over video descriptions.
//!
//! Counts are floored at 1 so blank or degenerate input can never divide by
//! zero; fully blank text short-circuits to 0.0 for both metrics.

const VOWELS: &str = "aeiouy";

/// Flesch-Kincaid grade level.
pub fn grade_level(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let words = word_count(text) as f64;
    let sentences = sentence_count(text) as f64;
    let syllables = syllable_count(text) as f64;

    0.39 * (words / sentences) + 11.8 * (syllables / words) - 15.59
}

/// Flesch reading-ease score.
pub fn reading_score(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let words = word_count(text) as f64;
    let sentences = sentence_count(text) as f64;
    let syllables = syllable_count(text) as f64;

    206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)
}

/// Whitespace-delimited word count, never less than 1.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}

/// Sentence count: segments split on `.`, `!`, `?`, trailing empties dropped,
/// never less than 1.
pub fn sentence_count(text: &str) -> usize {
    let mut segments: Vec<&str> = text.split(['.', '!', '?']).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments.len().max(1)
}

fn syllable_count(text: &str) -> usize {
    text.split_whitespace().map(syllables_in_word).sum()
}

/// Vowel-group syllable estimate: consecutive vowels count once, a trailing
/// `e` is discounted, and every word has at least one syllable.
fn syllables_in_word(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut count: isize = 0;
    let mut prev_vowel = false;
    for c in word.chars() {
        if VOWELS.contains(c) {
            if !prev_vowel {
                count += 1;
                prev_vowel = true;
            }
        } else {
            prev_vowel = false;
        }
    }
    if word.ends_with('e') {
        count -= 1;
    }
    count.max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_never_drop_below_one() {
        assert_eq!(word_count(""), 1);
        assert_eq!(sentence_count(""), 1);
        assert_eq!(word_count("   "), 1);
        assert_eq!(sentence_count("..."), 1);
    }

    #[test]
    fn blank_text_scores_zero() {
        assert_eq!(grade_level(""), 0.0);
        assert_eq!(reading_score(""), 0.0);
        assert_eq!(grade_level("   "), 0.0);
    }

    #[test]
    fn syllable_estimates() {
        assert_eq!(syllables_in_word("cat"), 1);
        // v-i-d-eo: "eo" is one vowel group
        assert_eq!(syllables_in_word("video"), 2);
        // Trailing e is discounted: lov-e -> 1
        assert_eq!(syllables_in_word("love"), 1);
        // Floor of one even when the discount takes it to zero
        assert_eq!(syllables_in_word("the"), 1);
        assert_eq!(syllables_in_word("xyz"), 1);
    }

    #[test]
    fn sentence_splitting() {
        assert_eq!(sentence_count("One. Two! Three?"), 3);
        assert_eq!(sentence_count("No terminator"), 1);
    }

    #[test]
    fn deterministic_for_same_input() {
        let text = "The quick brown fox jumps over the lazy dog. It was fast!";
        let first = (grade_level(text), reading_score(text));
        for _ in 0..5 {
            assert_eq!((grade_level(text), reading_score(text)), first);
        }
    }

    #[test]
    fn known_values_for_simple_text() {
        // 9 words, 2 sentences, 9 syllables: grade = 0.39*4.5 + 11.8*1 - 15.59
        let text = "The cat sat on the mat. The dog ran.";
        let grade = grade_level(text);
        assert!((grade - (0.39 * 4.5 + 11.8 - 15.59)).abs() < 1e-9);
        let score = reading_score(text);
        assert!((score - (206.835 - 1.015 * 4.5 - 84.6)).abs() < 1e-9);
    }
}
