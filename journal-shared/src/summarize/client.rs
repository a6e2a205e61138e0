/// Chat completion client
///
/// Talks to either a plain OpenAI-compatible endpoint or an Azure OpenAI
/// deployment. One request per summary, bounded by the configured timeout.

use super::{prompt, SummarizeError, Summarizer, Summary};
use crate::models::Entry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Azure OpenAI REST API version
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-12-01-preview";

/// Default model (or Azure deployment) name
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 400;

/// How requests are routed and authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    /// `POST {endpoint}/chat/completions`, bearer token
    OpenAi,

    /// `POST {endpoint}/openai/deployments/{model}/chat/completions`, `api-key` header
    Azure { api_version: String },
}

/// Connection settings for the summarization endpoint
#[derive(Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub provider: LlmProvider,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    /// Full request URL for the configured provider
    pub fn request_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        match &self.provider {
            LlmProvider::OpenAi => format!("{}/chat/completions", base),
            LlmProvider::Azure { api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base, self.model, api_version
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// [`Summarizer`] backed by a chat completions endpoint
#[derive(Debug, Clone)]
pub struct ChatCompletionsSummarizer {
    config: LlmConfig,
    client: reqwest::Client,
}

impl ChatCompletionsSummarizer {
    pub fn new(config: LlmConfig) -> Result<Self, SummarizeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl Summarizer for ChatCompletionsSummarizer {
    async fn summarize(&self, entries: &[Entry]) -> Result<Summary, SummarizeError> {
        if entries.is_empty() {
            return Err(SummarizeError::NoEntries);
        }

        let user_prompt = prompt::build_prompt(entries);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let request = self.client.post(self.config.request_url()).json(&body);
        let request = match self.config.provider {
            LlmProvider::OpenAi => request.bearer_auth(&self.config.api_key),
            LlmProvider::Azure { .. } => request.header("api-key", &self.config.api_key),
        };

        debug!(entries = entries.len(), model = %self.config.model, "Requesting summary");
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Summarization endpoint returned an error");
            return Err(SummarizeError::Status { status, body });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Malformed(e.to_string()))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SummarizeError::Malformed("reply has no choices".to_string()))?;

        prompt::parse_reply(&content)
    }
}
