use anyhow::{bail, Result};
use async_trait::async_trait;
use textlens_schemas::Sentiment;
use tracing::debug;

use crate::analyzer::{Analyzer, AnalyzerOutput};
use crate::keywords::KeywordExtractor;

pub const UNTITLED: &str = "Untitled Document";

const POSITIVE_WORDS: &[&str] = &["great", "awesome"];
const NEGATIVE_WORDS: &[&str] = &["bad", "terrible"];
const FIXED_TOPICS: [&str; 2] = ["llm", "prototype"];

const CONFIDENT: f32 = 0.95;
const UNSURE: f32 = 0.85;

/// Test seam that makes the heuristic analyzer fail on demand, standing in
/// for an external service outage. Matches case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultTrigger(String);

impl FaultTrigger {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self(trigger.into().to_lowercase())
    }

    pub fn matches(&self, text: &str) -> bool {
        !self.0.is_empty() && text.to_lowercase().contains(&self.0)
    }
}

/// Deterministic analyzer that needs nothing beyond the text itself
pub struct HeuristicAnalyzer {
    keywords: KeywordExtractor,
    fault_trigger: Option<FaultTrigger>,
}

impl Default for HeuristicAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicAnalyzer {
    /// Analyzer without a fault hook
    pub fn new() -> Self {
        Self {
            keywords: KeywordExtractor::new(),
            fault_trigger: None,
        }
    }

    pub fn with_fault_trigger(mut self, trigger: Option<FaultTrigger>) -> Self {
        self.fault_trigger = trigger;
        self
    }

    /// Run the heuristics synchronously
    pub fn analyze_text(&self, text: &str) -> Result<AnalyzerOutput> {
        if let Some(trigger) = &self.fault_trigger {
            if trigger.matches(text) {
                bail!("simulated analyzer failure triggered by '{}'", trigger.0);
            }
        }

        let keywords = self.keywords.extract(text);
        let (first, second) = match keywords.as_slice() {
            [first, second, ..] => (first, second),
            _ => bail!(
                "text needs at least two distinct words to summarize, found {}",
                keywords.len()
            ),
        };

        let summary = format!(
            "A summary of the provided text. It covers key topics like {} and {}.",
            first, second
        );

        let mut topics = Vec::with_capacity(3);
        topics.push(first.clone());
        topics.extend(FIXED_TOPICS.iter().map(|t| t.to_string()));

        let sentiment = detect_sentiment(text);
        let confidence_score = if sentiment.is_neutral() { UNSURE } else { CONFIDENT };

        debug!(
            "Heuristic analysis: sentiment={}, top keywords={:?}",
            sentiment, keywords
        );

        Ok(AnalyzerOutput {
            summary,
            title: derive_title(text),
            topics,
            sentiment,
            confidence_score,
        })
    }
}

#[async_trait]
impl Analyzer for HeuristicAnalyzer {
    async fn analyze(&self, text: &str) -> Result<AnalyzerOutput> {
        self.analyze_text(text)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// First line when the text spans several lines, otherwise a placeholder
fn derive_title(text: &str) -> String {
    if !text.contains('\n') {
        return UNTITLED.to_string();
    }

    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        UNTITLED.to_string()
    } else {
        first_line.to_string()
    }
}

/// Positive words are checked before negative ones
fn detect_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();

    if POSITIVE_WORDS.iter().any(|w| lower.contains(w)) {
        Sentiment::Positive
    } else if NEGATIVE_WORDS.iter().any(|w| lower.contains(w)) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> HeuristicAnalyzer {
        HeuristicAnalyzer::new().with_fault_trigger(Some(FaultTrigger::new("fail")))
    }

    #[test]
    fn test_positive_text() {
        let output = analyzer()
            .analyze_text("Great news! The weather is great today.")
            .unwrap();

        assert_eq!(output.sentiment, Sentiment::Positive);
        assert_eq!(output.confidence_score, 0.95);
        assert_eq!(output.topics, vec!["great", "llm", "prototype"]);
        assert_eq!(output.title, UNTITLED);
        assert_eq!(
            output.summary,
            "A summary of the provided text. It covers key topics like great and news."
        );
    }

    #[test]
    fn test_negative_and_neutral() {
        let negative = analyzer().analyze_text("What a terrible, terrible day").unwrap();
        assert_eq!(negative.sentiment, Sentiment::Negative);
        assert_eq!(negative.confidence_score, 0.95);

        let neutral = analyzer().analyze_text("The meeting is on Tuesday").unwrap();
        assert_eq!(neutral.sentiment, Sentiment::Neutral);
        assert_eq!(neutral.confidence_score, 0.85);
    }

    #[test]
    fn test_positive_wins_over_negative() {
        let output = analyzer().analyze_text("Awesome start, bad ending").unwrap();
        assert_eq!(output.sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_sentiment_matches_substrings() {
        // "badge" contains "bad"
        let output = analyzer().analyze_text("Pick up the badge").unwrap();
        assert_eq!(output.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_title_from_first_line() {
        let output = analyzer()
            .analyze_text("  Quarterly Report  \nRevenue grew across regions.")
            .unwrap();
        assert_eq!(output.title, "Quarterly Report");

        let blank_first = analyzer().analyze_text("\nRevenue grew again").unwrap();
        assert_eq!(blank_first.title, UNTITLED);
    }

    #[test]
    fn test_fault_trigger() {
        let err = analyzer().analyze_text("fail this analysis").unwrap_err();
        assert!(err.to_string().contains("simulated analyzer failure"));

        assert!(analyzer().analyze_text("This will FAIL loudly").is_err());
    }

    #[test]
    fn test_fault_trigger_disabled() {
        let output = HeuristicAnalyzer::new()
            .analyze_text("fail this analysis")
            .unwrap();
        assert_eq!(output.topics[0], "fail");
    }

    #[test]
    fn test_single_word_text_fails() {
        let err = analyzer().analyze_text("hello hello hello").unwrap_err();
        assert!(err.to_string().contains("at least two distinct words"));
    }

    #[tokio::test]
    async fn test_trait_dispatch() {
        let analyzer: Box<dyn Analyzer> = Box::new(analyzer());
        let output = analyzer.analyze("Rust is awesome and rust is fast").await.unwrap();

        assert_eq!(analyzer.name(), "heuristic");
        assert_eq!(output.topics.len(), 3);
        assert_eq!(output.topics[0], "rust");
    }
}
