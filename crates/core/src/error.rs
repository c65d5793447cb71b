//! User-facing failures of an analysis action.
//!
//! Messages are written for direct display. Feed problems are not errors here:
//! they surface as [`crate::feed::FeedOutcome::Unavailable`] and only turn into
//! [`AnalysisError::NoContentAvailable`] when there is no manual text to fall back on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No API key for the configured model provider.
    #[error("LLM API key is not configured. Please set the {env_var} environment variable.")]
    MissingCredential { env_var: &'static str },

    #[error("invalid analysis config: {0}")]
    InvalidConfig(String),

    /// Neither a usable feed nor manual text.
    #[error("{0}")]
    NoContentAvailable(String),

    /// The model call failed or its output was not JSON.
    #[error("AI analysis error: {message}")]
    Upstream {
        message: String,
        raw_output: Option<String>,
    },
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "missing_credential",
            Self::InvalidConfig(_) => "invalid_config",
            Self::NoContentAvailable(_) => "no_content_available",
            Self::Upstream { .. } => "upstream_analysis_error",
        }
    }
}
