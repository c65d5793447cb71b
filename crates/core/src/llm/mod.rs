pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod json;

use crate::config::Settings;
use std::fmt;
use std::sync::Arc;

/// Sampling temperature for every provider. Low, to favour repeatable output.
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Anthropic,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::Anthropic => f.write_str("anthropic"),
        }
    }
}

impl Provider {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => anyhow::bail!("unknown LLM_PROVIDER: {other} (expected gemini or anthropic)"),
        }
    }
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Sends one prompt and returns the model's raw text, expected to hold a JSON object.
    async fn generate_json(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Builds the configured provider's client. Fails on a missing API key.
pub fn client_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn LlmClient>> {
    let provider = match settings.llm_provider.as_deref() {
        Some(s) => Provider::parse(s)?,
        None => Provider::Gemini,
    };

    Ok(match provider {
        Provider::Gemini => Arc::new(gemini::GeminiClient::from_settings(settings)?),
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::from_settings(settings)?),
    })
}
