use anyhow::{Context, Result};
use std::str::FromStr;

const DEFAULT_LLM_CONFIDENCE: f32 = 0.95;
const DEFAULT_FAULT_TRIGGER: &str = "fail";

/// Configuration for the analysis pipeline
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub openai: OpenAiConfig,
    pub ollama: OllamaConfig,
    pub timeout_secs: u64,
    /// Confidence reported for LLM-backed analyses. The providers give no
    /// usable signal, so this is a fixed, tunable value.
    pub llm_confidence: f32,
    /// Substring that makes the heuristic analyzer fail on purpose.
    /// `None` disables the hook.
    pub fault_trigger: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    /// Fallback key used when a request carries none
    pub api_key: Option<String>,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            temperature: 0.0,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "gemma3:1b".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
            timeout_secs: 60,
            llm_confidence: DEFAULT_LLM_CONFIDENCE,
            fault_trigger: Some(DEFAULT_FAULT_TRIGGER.to_string()),
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let openai = OpenAiConfig {
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.openai.base_url),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.openai.model),
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            temperature: defaults.openai.temperature,
        };

        let ollama = OllamaConfig {
            base_url: lookup("OLLAMA_URL").unwrap_or(defaults.ollama.base_url),
            model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ollama.model),
        };

        let timeout_secs = parse_var(&lookup, "TEXTLENS_LLM_TIMEOUT_SECS")?
            .unwrap_or(defaults.timeout_secs);

        let llm_confidence: f32 = parse_var(&lookup, "TEXTLENS_LLM_CONFIDENCE")?
            .unwrap_or(defaults.llm_confidence);
        if !(0.0..=1.0).contains(&llm_confidence) {
            anyhow::bail!(
                "TEXTLENS_LLM_CONFIDENCE must be within [0, 1], got {}",
                llm_confidence
            );
        }

        // An explicitly empty trigger turns the fault hook off
        let fault_trigger = match lookup("TEXTLENS_FAULT_TRIGGER") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => defaults.fault_trigger,
        };

        Ok(Self {
            openai,
            ollama,
            timeout_secs,
            llm_confidence,
            fault_trigger,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: '{}'", key, raw))
        })
        .transpose()
}
