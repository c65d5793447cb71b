pub mod prompt;

use crate::domain::report::StockAnalysisReport;
use crate::domain::request::AnalysisConfig;
use crate::error::AnalysisError;
use crate::feed::{FeedOutcome, NewsFetcher};
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{json, LlmClient};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::Instrument;

/// The news text to analyze plus the status note shown in front of it in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedInput {
    pub status_note: String,
    pub news_text: String,
}

impl ComposedInput {
    pub fn raw_news_input(&self) -> String {
        format!("{}{}", self.status_note, self.news_text)
    }
}

pub struct Analyzer {
    fetcher: NewsFetcher,
    llm: Arc<dyn LlmClient>,
}

impl Analyzer {
    pub fn new(fetcher: NewsFetcher, llm: Arc<dyn LlmClient>) -> Self {
        Self { fetcher, llm }
    }

    pub async fn analyze(
        &self,
        config: &AnalysisConfig,
    ) -> Result<StockAnalysisReport, AnalysisError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "analysis",
            %run_id,
            provider = %self.llm.provider(),
            has_feed = !config.feed_url.trim().is_empty(),
            has_notification_key = config.has_notification_key(),
        );
        self.analyze_at(config, Utc::now().date_naive())
            .instrument(span)
            .await
    }

    /// Same as [`Analyzer::analyze`] with an explicit date for the `analysisDate` fallback.
    pub async fn analyze_at(
        &self,
        config: &AnalysisConfig,
        today: NaiveDate,
    ) -> Result<StockAnalysisReport, AnalysisError> {
        config.validate()?;

        let input = self.compose_input(config).await?;
        let watchlist = config.watchlist_tickers();

        let prompt = prompt::build_prompt(&prompt::PromptInput {
            news_text: &input.news_text,
            watchlist: &watchlist,
            item_count: config.item_count,
            history_window_days: config.history_window_days,
        });

        tracing::info!(
            watchlist_len = watchlist.len(),
            news_chars = input.news_text.len(),
            "requesting model analysis"
        );

        let raw = self.llm.generate_json(&prompt).await.map_err(upstream)?;

        let normalized = json::parse_report(&raw, today).map_err(|err| AnalysisError::Upstream {
            message: format!("{err:#}"),
            raw_output: Some(raw.clone()),
        })?;

        if normalized.defaulted_fields > 0 {
            tracing::warn!(
                defaulted_fields = normalized.defaulted_fields,
                "model response was missing fields; placeholders applied"
            );
        }

        let mut report = normalized.report;
        report.raw_news_input = Some(input.raw_news_input());
        report.watchlist_used = Some(watchlist);

        tracing::info!(
            identified = report.identified_stocks.len(),
            others = report.other_relevant_stocks.len(),
            "analysis complete"
        );
        Ok(report)
    }

    /// Merges manual text with the feed digest. Fails only when nothing is left to analyze.
    pub async fn compose_input(
        &self,
        config: &AnalysisConfig,
    ) -> Result<ComposedInput, AnalysisError> {
        let manual = config.manual_text.trim();
        let feed_url = config.feed_url.trim();

        if feed_url.is_empty() {
            if manual.is_empty() {
                return Err(no_content());
            }
            return Ok(ComposedInput {
                status_note: String::new(),
                news_text: manual.to_string(),
            });
        }

        match self.fetcher.fetch(feed_url, config.item_count).await {
            FeedOutcome::Digest { text, .. } => {
                let news_text = if manual.is_empty() {
                    format!("News from RSS Feed ({feed_url}):\n{text}")
                } else {
                    format!(
                        "Manually Entered News:\n{manual}\n\nNews from RSS Feed ({feed_url}):\n{text}"
                    )
                };
                Ok(ComposedInput {
                    status_note: format!("Successfully fetched news from {feed_url}.\n\n"),
                    news_text,
                })
            }
            FeedOutcome::Unavailable(_) if manual.is_empty() => {
                Err(AnalysisError::NoContentAvailable(format!(
                    "Could not fetch news from RSS feed: {feed_url}. \
Please provide news text manually or ensure the RSS feed is valid and accessible."
                )))
            }
            FeedOutcome::Unavailable(_) => Ok(ComposedInput {
                status_note: format!(
                    "Could not fetch news from RSS feed: {feed_url}. Using manually entered news.\n\n"
                ),
                news_text: manual.to_string(),
            }),
        }
    }
}

fn no_content() -> AnalysisError {
    AnalysisError::NoContentAvailable(
        "No news content available. Please provide news text manually or a valid RSS feed URL."
            .to_string(),
    )
}

fn upstream(err: anyhow::Error) -> AnalysisError {
    let raw_output = err
        .downcast_ref::<LlmDiagnosticsError>()
        .and_then(|diag| diag.raw_output.clone());
    AnalysisError::Upstream {
        message: format!("{err:#}"),
        raw_output,
    }
}
