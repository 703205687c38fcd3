use chrono::Utc;
use std::time::Duration;
use textlens_indexing::AnalysisStore;
use textlens_schemas::{generate_analysis_id, AnalysisMetadata, AnalysisRecord};
use tracing::{info, warn};

use crate::analyzer::{Analyzer, AnalyzerMode};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::heuristic::{FaultTrigger, HeuristicAnalyzer};
use crate::keywords::KeywordExtractor;
use crate::llm_analyzer::{CompletionClient, OllamaClient, OpenAiClient, StructuredLlmAnalyzer};

/// Runs one analysis end to end and records the result
pub struct AnalysisService {
    store: AnalysisStore,
    config: AnalysisConfig,
    heuristic: HeuristicAnalyzer,
    keywords: KeywordExtractor,
}

impl AnalysisService {
    pub fn new(store: AnalysisStore, config: AnalysisConfig) -> Self {
        let heuristic = HeuristicAnalyzer::new()
            .with_fault_trigger(config.fault_trigger.as_deref().map(FaultTrigger::new));

        Self {
            store,
            config,
            heuristic,
            keywords: KeywordExtractor::new(),
        }
    }

    /// Analyze `text` with the analyzer named by `mode`
    pub async fn analyze(
        &self,
        text: &str,
        mode: &str,
        credential: Option<&str>,
    ) -> Result<AnalysisRecord, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::bad_input("Empty input text."));
        }

        let mode: AnalyzerMode = mode.parse()?;
        self.analyze_with_mode(text, mode, credential).await
    }

    /// Analyze with an already-resolved mode
    pub async fn analyze_with_mode(
        &self,
        text: &str,
        mode: AnalyzerMode,
        credential: Option<&str>,
    ) -> Result<AnalysisRecord, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::bad_input("Empty input text."));
        }

        match mode {
            AnalyzerMode::Heuristic => self.run(&self.heuristic, text).await,
            AnalyzerMode::OpenAi | AnalyzerMode::Ollama => {
                let analyzer = self.llm_analyzer(mode, credential)?;
                self.run(&analyzer, text).await
            }
        }
    }

    /// Records whose topics or keywords match `term`; everything when absent
    pub fn search(&self, term: Option<&str>) -> Vec<AnalysisRecord> {
        self.store.search_by_topic_or_keyword(term)
    }

    pub fn all(&self) -> Vec<AnalysisRecord> {
        self.store.all()
    }

    /// Shut down, returning the store so its records can be drained
    pub fn into_store(self) -> AnalysisStore {
        self.store
    }

    fn llm_analyzer(
        &self,
        mode: AnalyzerMode,
        credential: Option<&str>,
    ) -> Result<StructuredLlmAnalyzer, AnalysisError> {
        let timeout = Duration::from_secs(self.config.timeout_secs);

        let client: Box<dyn CompletionClient> = match mode {
            AnalyzerMode::OpenAi => {
                let api_key = credential
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .or_else(|| self.config.openai.api_key.clone())
                    .ok_or_else(|| {
                        AnalysisError::bad_input("OpenAI API key is required for GPT model.")
                    })?;

                let client = OpenAiClient::new(&self.config.openai, api_key, timeout)
                    .map_err(AnalysisError::AnalysisFailed)?;
                Box::new(client)
            }
            AnalyzerMode::Ollama => {
                let client = OllamaClient::new(&self.config.ollama, timeout)
                    .map_err(AnalysisError::AnalysisFailed)?;
                Box::new(client)
            }
            AnalyzerMode::Heuristic => {
                return Err(AnalysisError::bad_input(
                    "Heuristic mode has no language model backend",
                ))
            }
        };

        Ok(StructuredLlmAnalyzer::new(client, self.config.llm_confidence))
    }

    async fn run(&self, analyzer: &dyn Analyzer, text: &str) -> Result<AnalysisRecord, AnalysisError> {
        info!("Analyzing {} chars with {}", text.len(), analyzer.name());

        let output = analyzer.analyze(text).await.map_err(|e| {
            warn!("{} analysis failed: {:#}", analyzer.name(), e);
            AnalysisError::AnalysisFailed(e)
        })?;

        // Keywords always come from the raw text, whatever the analyzer said
        let keywords = self.keywords.extract(text);

        let record = AnalysisRecord {
            id: generate_analysis_id(),
            input_text: text.to_string(),
            summary: output.summary,
            metadata: AnalysisMetadata {
                title: output.title,
                topics: output.topics,
                sentiment: output.sentiment,
                keywords,
                confidence_score: output.confidence_score.clamp(0.0, 1.0),
            },
            created_at: Utc::now().to_rfc3339(),
        };

        self.store.append(record.clone());
        info!("Stored analysis {}", record.id);

        Ok(record)
    }
}
