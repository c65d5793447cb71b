pub mod analysis;
pub mod domain;
pub mod error;
pub mod feed;
pub mod llm;

pub mod config {
    use crate::error::AnalysisError;

    pub const DEFAULT_FEED_RELAY_URL: &str = "https://api.allorigins.win/raw";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub llm_provider: Option<String>,
        pub gemini_api_key: Option<String>,
        pub anthropic_api_key: Option<String>,
        /// `None` disables the relay and every fetch goes direct.
        pub feed_relay_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let feed_relay_url = match std::env::var("FEED_RELAY_URL") {
                Ok(s) if s.trim().is_empty() => None,
                Ok(s) => Some(s.trim().to_string()),
                Err(_) => Some(DEFAULT_FEED_RELAY_URL.to_string()),
            };

            Ok(Self {
                llm_provider: non_empty_var("LLM_PROVIDER"),
                gemini_api_key: non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("API_KEY")),
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                feed_relay_url,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_gemini_api_key(&self) -> Result<&str, AnalysisError> {
            self.gemini_api_key
                .as_deref()
                .ok_or(AnalysisError::MissingCredential {
                    env_var: "GEMINI_API_KEY",
                })
        }

        pub fn require_anthropic_api_key(&self) -> Result<&str, AnalysisError> {
            self.anthropic_api_key
                .as_deref()
                .ok_or(AnalysisError::MissingCredential {
                    env_var: "ANTHROPIC_API_KEY",
                })
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

}
