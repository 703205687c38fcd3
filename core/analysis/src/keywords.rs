//! Frequency-ranked keyword extraction.
//!
//! Every analysis path indexes records by the same keyword list, so this is
//! the only place keywords are computed.

use regex::Regex;
use std::collections::HashMap;

/// Number of keywords kept per text
pub const MAX_KEYWORDS: usize = 3;

/// Keyword extractor ranking words by raw frequency
pub struct KeywordExtractor {
    word_pattern: Regex,
    max_keywords: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::with_limit(MAX_KEYWORDS)
    }

    pub fn with_limit(max_keywords: usize) -> Self {
        Self {
            word_pattern: Regex::new(r"\b\w+\b").expect("word pattern is valid"),
            max_keywords,
        }
    }

    /// Lower-cased word tokens in order of appearance
    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.word_pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
    }

    /// Distinct tokens with their counts, in first-occurrence order
    pub fn frequencies(&self, text: &str) -> Vec<(String, usize)> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();

        for token in self.tokenize(text) {
            match positions.get(&token) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    positions.insert(token.clone(), counts.len());
                    counts.push((token, 1));
                }
            }
        }

        counts
    }

    /// Top keywords, most frequent first. Ties keep first-occurrence order
    /// because the sort is stable over the insertion-ordered counts.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut counts = self.frequencies(text);
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        counts
            .into_iter()
            .take(self.max_keywords)
            .map(|(word, _)| word)
            .collect()
    }
}
