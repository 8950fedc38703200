//! Lexicon-based sentiment over description corpora.
//!
//! A description scores in [-100, 100] from the share of happy vs sad tokens;
//! a corpus aggregates the non-zero scores against a fixed threshold.

use tubepulse_common::Sentiment;

/// Share of non-zero scores an inclination must reach before the corpus is
/// called positive or negative.
const THRESHOLD: f64 = 70.0;

const HAPPY_WORDS: &[&str] = &[
    "happy",
    "joy",
    "excellent",
    "great",
    "amazing",
    "wonderful",
    "fantastic",
    "good",
    "love",
    "awesome",
    "excited",
    "fun",
    "beautiful",
    "smile",
    "laugh",
    "best",
    "perfect",
    "brilliant",
    "😊",
    "😃",
    "😄",
    "🙂",
    ":-)",
    ":)",
    "=)",
];

const SAD_WORDS: &[&str] = &[
    "sad",
    "bad",
    "terrible",
    "awful",
    "horrible",
    "worst",
    "hate",
    "disappointed",
    "unfortunate",
    "sorry",
    "fail",
    "poor",
    "crying",
    "unhappy",
    "miserable",
    "😢",
    "😭",
    "😞",
    "😥",
    ":-(",
    ":(",
    "=(",
];

/// Score a single description. Positive for happy-leaning text, negative for
/// sad-leaning, 0.0 for a tie or no sentiment tokens at all.
pub fn score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let mut happy: u64 = 0;
    let mut sad: u64 = 0;
    for token in lowered.split_whitespace() {
        if HAPPY_WORDS.contains(&token) {
            happy += 1;
        } else if SAD_WORDS.contains(&token) {
            sad += 1;
        }
    }

    let total = (happy + sad).max(1);
    // Integer percentages, matching the wire-visible rounding.
    let happy_pct = (happy * 100 / total) as f64;
    let sad_pct = (sad * 100 / total) as f64;

    if happy > sad {
        happy_pct
    } else if sad > happy {
        -sad_pct
    } else {
        0.0
    }
}

/// Aggregate a corpus into a categorical sentiment.
///
/// Zero scores carry no opinion and are discarded. The positive and negative
/// inclinations are each averaged over the full non-zero set, so a corpus
/// split between strong positives and strong negatives lands on neutral
/// rather than whichever side happens to be checked first.
pub fn aggregate<S: AsRef<str>>(texts: &[S]) -> Sentiment {
    let scores: Vec<f64> = texts
        .iter()
        .map(|t| score(t.as_ref()))
        .filter(|s| *s != 0.0)
        .collect();

    if scores.is_empty() {
        return Sentiment::Neutral;
    }

    let n = scores.len() as f64;
    let happy_avg = scores.iter().filter(|s| **s > 0.0).sum::<f64>() / n;
    let sad_avg = scores.iter().filter(|s| **s < 0.0).sum::<f64>().abs() / n;

    if happy_avg > THRESHOLD {
        Sentiment::Positive
    } else if sad_avg > THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
