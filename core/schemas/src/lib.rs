use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ULID and ID Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisId(pub String);

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn generate_analysis_id() -> AnalysisId {
    AnalysisId(format!("ana_{}", ulid::Ulid::new()))
}

// ============================================================================
// Analysis Record Schema
// ============================================================================

/// The stored outcome of one analysis. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: AnalysisId,
    pub input_text: String,
    pub summary: String,
    pub metadata: AnalysisMetadata,
    pub created_at: String, // RFC3339
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub title: String,
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    /// Frequency-ranked, most frequent first. Always computed from the input
    /// text, never taken from an analyzer.
    pub keywords: Vec<String>,
    pub confidence_score: f32,
}

impl AnalysisMetadata {
    /// Case-insensitive exact match against any topic or keyword.
    pub fn mentions(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.topics
            .iter()
            .chain(self.keywords.iter())
            .any(|t| t.to_lowercase() == needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "positive")]
    Positive,
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "negative")]
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Sentiment::Neutral)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSentiment(pub String);

impl fmt::Display for UnknownSentiment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown sentiment '{}', expected positive, neutral or negative",
            self.0
        )
    }
}

impl std::error::Error for UnknownSentiment {}

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(UnknownSentiment(s.to_string())),
        }
    }
}

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    pub model_choice: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<AnalysisRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AnalysisRecord {
        AnalysisRecord {
            id: generate_analysis_id(),
            input_text: "Great news!\nThe weather is great today.".to_string(),
            summary: "A summary.".to_string(),
            metadata: AnalysisMetadata {
                title: "Great news!".to_string(),
                topics: vec!["great".into(), "llm".into(), "prototype".into()],
                sentiment: Sentiment::Positive,
                keywords: vec!["great".into(), "news".into(), "the".into()],
                confidence_score: 0.95,
            },
            created_at: "2025-11-02T18:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_generate_analysis_id() {
        let a = generate_analysis_id();
        let b = generate_analysis_id();
        assert!(a.0.starts_with("ana_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_sentiment_wire_format() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"negative\"");

        let parsed: Result<Sentiment, _> = serde_json::from_str("\"happy\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_sentiment_from_str() {
        assert_eq!("Positive".parse::<Sentiment>(), Ok(Sentiment::Positive));
        assert_eq!(" neutral ".parse::<Sentiment>(), Ok(Sentiment::Neutral));
        assert!("mixed".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_record_serialization_shape() {
        let record = sample_record();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["metadata"]["sentiment"], "positive");
        assert_eq!(value["metadata"]["topics"][1], "llm");
        assert!(value["id"].as_str().unwrap().starts_with("ana_"));
    }

    #[test]
    fn test_metadata_mentions_is_case_insensitive() {
        let record = sample_record();
        assert!(record.metadata.mentions("LLM"));
        assert!(record.metadata.mentions("News"));
        assert!(!record.metadata.mentions("weather"));
    }

    #[test]
    fn test_analyze_request_without_key() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"text": "hello world", "model_choice": "mock"}"#).unwrap();
        assert!(request.api_key.is_none());
    }
}
