pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod keywords;
pub mod llm_analyzer;
pub mod service;

pub use analyzer::{Analyzer, AnalyzerMode, AnalyzerOutput};
pub use api::router;
pub use config::{AnalysisConfig, OllamaConfig, OpenAiConfig};
pub use error::AnalysisError;
pub use heuristic::{FaultTrigger, HeuristicAnalyzer};
pub use keywords::KeywordExtractor;
pub use llm_analyzer::{CompletionClient, OllamaClient, OpenAiClient, StructuredLlmAnalyzer};
pub use service::AnalysisService;
