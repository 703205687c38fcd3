use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use textlens_schemas::Sentiment;
use tracing::debug;

use crate::analyzer::{Analyzer, AnalyzerOutput};
use crate::config::{OllamaConfig, OpenAiConfig};

/// Number of topics the model is asked for and held to
pub const TOPIC_COUNT: usize = 3;

/// An external language model: prompt in, raw text out
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn provider(&self) -> &'static str;
}

/// Analyzer that asks a language model for a schema-conforming JSON object
pub struct StructuredLlmAnalyzer {
    client: Box<dyn CompletionClient>,
    confidence: f32,
}

impl StructuredLlmAnalyzer {
    pub fn new(client: Box<dyn CompletionClient>, confidence: f32) -> Self {
        Self {
            client,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Build the analysis prompt, embedding the output schema
    pub fn build_prompt(text: &str) -> String {
        format!(
            "Analyze the following text and return a JSON object with a summary, title, three key topics, and sentiment.\n{}\n\nText to analyze:\n{}",
            format_instructions(),
            text
        )
    }

    /// Validate a raw completion against the schema
    pub fn parse_response(&self, response: &str) -> Result<AnalyzerOutput> {
        let json_str = extract_json_object(response)
            .ok_or_else(|| anyhow!("Model response contains no JSON object"))?;

        let raw: RawAnalysis =
            serde_json::from_str(json_str).context("Failed to parse model analysis response")?;

        let summary = raw.summary.trim().to_string();
        if summary.is_empty() {
            bail!("Model returned an empty summary");
        }

        let title = raw.title.trim().to_string();
        if title.is_empty() {
            bail!("Model returned an empty title");
        }

        if raw.topics.len() != TOPIC_COUNT {
            bail!(
                "Model returned {} topics, expected {}",
                raw.topics.len(),
                TOPIC_COUNT
            );
        }

        let sentiment: Sentiment = raw.sentiment.parse()?;

        Ok(AnalyzerOutput {
            summary,
            title,
            topics: raw.topics,
            sentiment,
            confidence_score: self.confidence,
        })
    }
}

#[async_trait]
impl Analyzer for StructuredLlmAnalyzer {
    async fn analyze(&self, text: &str) -> Result<AnalyzerOutput> {
        let prompt = Self::build_prompt(text);

        debug!(
            "Requesting structured analysis from {} ({} chars)",
            self.client.provider(),
            text.len()
        );

        let response = self.client.complete(&prompt).await?;
        self.parse_response(&response)
    }

    fn name(&self) -> &'static str {
        self.client.provider()
    }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    summary: String,
    title: String,
    topics: Vec<String>,
    sentiment: String,
}

/// JSON schema of the object the model must return
pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "A concise 1-2 sentence summary of the text."
            },
            "title": {
                "type": "string",
                "description": "The title of the text (if available) or a suitable title you create."
            },
            "topics": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": TOPIC_COUNT,
                "maxItems": TOPIC_COUNT,
                "description": "A list of three key topics from the text."
            },
            "sentiment": {
                "type": "string",
                "enum": ["positive", "neutral", "negative"],
                "description": "The overall sentiment, which must be 'positive', 'neutral', or 'negative'."
            }
        },
        "required": ["summary", "title", "topics", "sentiment"]
    })
}

fn format_instructions() -> String {
    let schema = serde_json::to_string_pretty(&analysis_schema()).unwrap_or_default();
    format!(
        "The output must be a single JSON object conforming to the JSON schema below. \
         Return only the JSON object, without commentary.\n```json\n{}\n```",
        schema
    )
}

/// Outermost `{ ... }` span; models like to wrap JSON in prose or fences
fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

// ============================================================================
// Providers
// ============================================================================

/// Hosted OpenAI chat completions
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": self.temperature,
            "response_format": { "type": "json_object" }
        });

        debug!("Calling OpenAI at {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .context("Failed to call OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("OpenAI API error {}: {}", status, error_text);
        }

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("Empty response from OpenAI"))
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}

/// Local Ollama server
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request_body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
            "options": {
                "temperature": 0.0,
            }
        });

        debug!("Calling Ollama at {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .context("Failed to call Ollama API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Ollama API error {}: {}", status, error_text);
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(ollama_response.response)
    }

    fn provider(&self) -> &'static str {
        "ollama"
    }
}

// Response structures
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}
