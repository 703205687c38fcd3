use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use textlens_schemas::Sentiment;

use crate::error::AnalysisError;

/// What an analyzer produces from raw text. Keywords are deliberately
/// absent: the service computes them itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerOutput {
    pub summary: String,
    pub title: String,
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    pub confidence_score: f32,
}

/// Given text, produce a summary, title, topics and sentiment
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<AnalyzerOutput>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Analyzer selection, resolved once from the caller's mode string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzerMode {
    /// Deterministic local heuristics
    Heuristic,
    /// Hosted OpenAI chat completions, requires an API key
    OpenAi,
    /// Locally reachable Ollama server, no key
    Ollama,
}

impl AnalyzerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerMode::Heuristic => "mock",
            AnalyzerMode::OpenAi => "gpt",
            AnalyzerMode::Ollama => "ollama",
        }
    }

    pub fn requires_credential(&self) -> bool {
        matches!(self, AnalyzerMode::OpenAi)
    }
}

impl fmt::Display for AnalyzerMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyzerMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" | "heuristic" => Ok(AnalyzerMode::Heuristic),
            "gpt" | "openai" => Ok(AnalyzerMode::OpenAi),
            "ollama" => Ok(AnalyzerMode::Ollama),
            _ => Err(AnalysisError::bad_input(format!(
                "Invalid model choice provided: '{}'",
                s
            ))),
        }
    }
}
