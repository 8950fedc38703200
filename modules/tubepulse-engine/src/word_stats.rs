//! Ranked word-frequency statistics over a description corpus.

use regex::Regex;
use std::collections::HashMap;

use tubepulse_common::WordCount;

/// Common English words excluded from the frequency table.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "i", "you", "she", "we",
    "they", "my", "your", "this", "these", "those", "or", "but", "if", "because", "just",
];

/// Compute the ranked word-frequency table for a corpus.
///
/// Tokens are lowercased and split on runs of non-word characters; empties,
/// single characters, stopwords, and pure-digit tokens are dropped. Output is
/// ordered by descending count, ties by first appearance in the corpus.
pub fn compute<S: AsRef<str>>(texts: &[S]) -> Vec<WordCount> {
    let joined = texts
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ");

    let splitter = Regex::new(r"\W+").expect("valid regex");

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for token in splitter.split(&joined) {
        let word = token.to_lowercase();
        if word.is_empty() || word.chars().count() <= 1 {
            continue;
        }
        if STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        if word.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        match counts.get_mut(&word) {
            Some(count) => *count += 1,
            None => {
                counts.insert(word.clone(), 1);
                first_seen.push(word);
            }
        }
    }

    let mut ranked: Vec<WordCount> = first_seen
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            WordCount { word, count }
        })
        .collect();
    // Stable sort keeps first-seen order within equal counts.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(stats: &[WordCount]) -> Vec<&str> {
        stats.iter().map(|w| w.word.as_str()).collect()
    }

    #[test]
    fn filters_stopwords_digits_and_short_tokens() {
        let stats = compute(&["the cat sat on a mat 42 x"]);
        let listed = words(&stats);
        assert!(!listed.contains(&"the"));
        assert!(!listed.contains(&"on"));
        assert!(!listed.contains(&"42"));
        assert!(!listed.contains(&"x"));
        assert!(listed.contains(&"cat"));
        assert!(listed.contains(&"sat"));
        assert!(listed.contains(&"mat"));
    }

    #[test]
    fn counts_across_texts_and_lowercases() {
        let stats = compute(&["Cat video", "cat CAT"]);
        assert_eq!(stats[0], WordCount { word: "cat".to_string(), count: 3 });
        assert_eq!(stats[1], WordCount { word: "video".to_string(), count: 1 });
    }

    #[test]
    fn splits_on_punctuation_runs() {
        let stats = compute(&["cat,cat!!cat...dog"]);
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].word, "cat");
        assert_eq!(stats[1].word, "dog");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let stats = compute(&["zebra apple zebra apple mango"]);
        assert_eq!(words(&stats), vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn descending_count_order() {
        let stats = compute(&["dog dog dog cat cat bird"]);
        assert_eq!(words(&stats), vec!["dog", "cat", "bird"]);
        let counts: Vec<u64> = stats.iter().map(|w| w.count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn empty_corpus_is_empty() {
        let texts: Vec<String> = vec![];
        assert!(compute(&texts).is_empty());
    }
}
