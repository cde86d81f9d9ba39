//! # Sentiment Scorer
//! Lexicon-based polarity for post titles. Pure and deterministic for a fixed
//! input string and a fixed lexicon build; the lexicon ships embedded in the
//! binary, so a model upgrade is a crate upgrade.
//!
//! Only the title is examined. Body text is deliberately ignored.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::model::{RawPost, ScoredPost};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Largest absolute word weight on the lexicon scale; polarity is the mean of
/// matched weights divided by this, which keeps the result inside [-1, 1].
const MAX_WORD_WEIGHT: f64 = 5.0;

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon weight for a word (0 if absent).
    #[inline]
    fn word_weight(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Continuous polarity of `text` in [-1, 1].
    ///
    /// Negation: if a negator appears within the previous 1..=3 tokens, the
    /// sign of that word's lexicon weight is inverted. Text with no lexicon
    /// hit at all (including empty or non-alphanumeric input) scores 0.0 —
    /// unscoreable input fails soft to neutral instead of erroring.
    pub fn polarity(&self, text: &str) -> f64 {
        // Collect tokens into a vector; negation needs backward indexing.
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum: i32 = 0;
        let mut hits: usize = 0;

        for i in 0..tokens.len() {
            let base = self.word_weight(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            sum += if negated { -base } else { base };
            hits += 1;
        }

        if hits == 0 {
            return 0.0;
        }
        (f64::from(sum) / (MAX_WORD_WEIGHT * hits as f64)).clamp(-1.0, 1.0)
    }

    /// Score one post: polarity of the title, label from the sign rule.
    pub fn score_post(&self, raw: RawPost) -> ScoredPost {
        let polarity = self.polarity(&raw.title);
        ScoredPost::from_raw(raw, polarity)
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Single-token negators ("no longer" is covered by "no" after tokenization).
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
    )
}
