use thiserror::Error;

/// Failures surfaced by the analysis pipeline.
///
/// Callers only ever see two classes: the input was rejected, or the
/// analysis itself failed. The latter keeps its full cause chain.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Empty text, unknown mode, or a missing credential.
    #[error("bad input: {0}")]
    BadInput(String),

    /// Any failure from an analyzer: simulated fault, transport error,
    /// malformed model output, or too little text to analyze.
    #[error("analysis failed: {0:#}")]
    AnalysisFailed(#[source] anyhow::Error),
}

impl AnalysisError {
    pub fn bad_input(msg: impl Into<String>) -> Self {
        AnalysisError::BadInput(msg.into())
    }

    pub fn is_bad_input(&self) -> bool {
        matches!(self, AnalysisError::BadInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_analysis_failed_keeps_cause_chain() {
        let cause: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = AnalysisError::AnalysisFailed(cause.context("Failed to call Ollama API").unwrap_err());

        let message = err.to_string();
        assert!(message.starts_with("analysis failed"));
        assert!(message.contains("Failed to call Ollama API"));
        assert!(message.contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_bad_input_display() {
        let err = AnalysisError::bad_input("Empty input text.");
        assert!(err.is_bad_input());
        assert_eq!(err.to_string(), "bad input: Empty input text.");
    }
}
