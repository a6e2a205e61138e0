/// Entry summarization
///
/// Sends a set of journal entries to an OpenAI-compatible chat completion
/// endpoint and parses the reply into a [`Summary`] (short text, overall
/// [`Sentiment`] and a list of insights).
///
/// # Modules
///
/// - `prompt`: Prompt construction and reply parsing
/// - `client`: HTTP client for OpenAI and Azure OpenAI deployments
///
/// The web layer only depends on the [`Summarizer`] trait, so tests can
/// substitute a stub and deployments without LLM settings install
/// [`DisabledSummarizer`].

pub mod client;
pub mod prompt;

use crate::models::Entry;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

pub use client::{ChatCompletionsSummarizer, LlmConfig, LlmProvider};

/// Error type for summarization
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("No entries selected")]
    NoEntries,

    #[error("Summarization is not configured")]
    NotConfigured,

    #[error("Request to summarization endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Summarization endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed summarization response: {0}")]
    Malformed(String),
}

/// Overall mood of a set of entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    /// Parses a model label; anything unrecognised is `Neutral`
    pub fn from_label(label: &str) -> Self {
        let label = label
            .trim()
            .trim_matches(|c: char| c == '[' || c == ']' || c == '.' || c == '*')
            .to_ascii_lowercase();

        match label.as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            "mixed" => Sentiment::Mixed,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
            Sentiment::Mixed => "Mixed",
        };
        f.write_str(label)
    }
}

/// Parsed summarization result; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub summary: String,
    pub sentiment: Sentiment,
    pub insights: Vec<String>,
}

/// Produces a [`Summary`] for a set of entries
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes `entries` in one upstream request
    ///
    /// # Errors
    ///
    /// `NoEntries` for an empty slice; transport, status and parse failures
    /// otherwise. No retry is attempted.
    async fn summarize(&self, entries: &[Entry]) -> Result<Summary, SummarizeError>;
}

/// Summarizer installed when no LLM endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSummarizer;

#[async_trait]
impl Summarizer for DisabledSummarizer {
    async fn summarize(&self, entries: &[Entry]) -> Result<Summary, SummarizeError> {
        if entries.is_empty() {
            return Err(SummarizeError::NoEntries);
        }
        Err(SummarizeError::NotConfigured)
    }
}
