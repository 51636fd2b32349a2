//! Keyword-count sentiment scoring
//!
//! A deliberately small heuristic: lowercase the text, split on whitespace,
//! and count exact matches against two fixed keyword lists. No stemming, no
//! fuzzy matching, no external calls. The score is the positive fraction in
//! [0, 1] with 0.5 as the neutral midpoint.

use crate::types::{Sentiment, SentimentLabel};

/// Words that count toward a positive score
const POSITIVE_WORDS: [&str; 7] = [
    "good",
    "great",
    "excellent",
    "amazing",
    "love",
    "perfect",
    "best",
];

/// Words that count toward a negative score
const NEGATIVE_WORDS: [&str; 7] = [
    "bad",
    "poor",
    "terrible",
    "worst",
    "hate",
    "awful",
    "disappointing",
];

/// Label thresholds on the [0, 1] score
const POSITIVE_THRESHOLD: f64 = 0.6;
const NEGATIVE_THRESHOLD: f64 = 0.4;

/// Score free text into a sentiment label, score, and confidence
///
/// Pure function: identical input always yields identical output. Text with
/// no keyword hits at all returns the neutral default (score 0.5,
/// confidence 0.5 since there is no signal either way).
pub fn analyze(text: &str) -> Sentiment {
    let lowered = text.to_lowercase();

    let mut positive = 0u32;
    let mut negative = 0u32;
    for word in lowered.split_whitespace() {
        if POSITIVE_WORDS.contains(&word) {
            positive += 1;
        }
        if NEGATIVE_WORDS.contains(&word) {
            negative += 1;
        }
    }

    if positive == 0 && negative == 0 {
        return Sentiment::neutral_default();
    }

    let score = f64::from(positive) / f64::from(positive + negative);

    let (label, confidence) = if score > POSITIVE_THRESHOLD {
        (SentimentLabel::Positive, 0.7 + (score - POSITIVE_THRESHOLD) * 0.5)
    } else if score < NEGATIVE_THRESHOLD {
        (SentimentLabel::Negative, 0.7 + (NEGATIVE_THRESHOLD - score) * 0.5)
    } else {
        (SentimentLabel::Neutral, 0.6)
    };

    Sentiment {
        label,
        score,
        confidence: confidence.clamp(0.0, 1.0),
    }
}
