use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ITEM_COUNT: usize = 5;
pub const DEFAULT_HISTORY_WINDOW_DAYS: u32 = 7;

/// Inputs for one analysis action. Built per request and dropped afterwards.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default)]
    pub feed_url: String,

    /// Comma-separated tickers.
    #[serde(default)]
    pub watchlist: String,

    /// Opaque push-notification key. Carried along, never validated or logged.
    #[serde(default)]
    pub notification_key: String,

    #[serde(default = "default_item_count")]
    pub item_count: usize,

    #[serde(default = "default_history_window_days")]
    pub history_window_days: u32,

    #[serde(default)]
    pub manual_text: String,
}

fn default_item_count() -> usize {
    DEFAULT_ITEM_COUNT
}

fn default_history_window_days() -> u32 {
    DEFAULT_HISTORY_WINDOW_DAYS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            watchlist: String::new(),
            notification_key: String::new(),
            item_count: DEFAULT_ITEM_COUNT,
            history_window_days: DEFAULT_HISTORY_WINDOW_DAYS,
            manual_text: String::new(),
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("feed_url", &self.feed_url)
            .field("watchlist", &self.watchlist)
            .field("notification_key", &"<redacted>")
            .field("item_count", &self.item_count)
            .field("history_window_days", &self.history_window_days)
            .field("manual_text_len", &self.manual_text.len())
            .finish()
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.item_count == 0 {
            return Err(AnalysisError::InvalidConfig(
                "itemCount must be a positive integer".to_string(),
            ));
        }
        if self.history_window_days == 0 {
            return Err(AnalysisError::InvalidConfig(
                "historyWindowDays must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    pub fn watchlist_tickers(&self) -> Vec<String> {
        parse_watchlist(&self.watchlist)
    }

    pub fn has_notification_key(&self) -> bool {
        !self.notification_key.trim().is_empty()
    }
}

/// Splits on commas and trims. Order and case are kept; duplicates are not removed.
pub fn parse_watchlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn watchlist_is_trimmed_and_order_preserved() {
        assert_eq!(parse_watchlist(" AAPL, msft ,GOOG"), vec!["AAPL", "msft", "GOOG"]);
    }

    #[test]
    fn watchlist_drops_empties_but_keeps_duplicates() {
        assert_eq!(parse_watchlist("AAPL,, ,AAPL,"), vec!["AAPL", "AAPL"]);
        assert!(parse_watchlist("").is_empty());
    }

    #[test]
    fn deserializes_partial_config_with_defaults() {
        let cfg: AnalysisConfig = serde_json::from_value(json!({
            "feedUrl": "https://example.com/rss",
            "watchlist": "AAPL"
        }))
        .unwrap();
        assert_eq!(cfg.item_count, DEFAULT_ITEM_COUNT);
        assert_eq!(cfg.history_window_days, DEFAULT_HISTORY_WINDOW_DAYS);
        assert!(cfg.manual_text.is_empty());
        assert!(!cfg.has_notification_key());
    }

    #[test]
    fn rejects_zero_counts() {
        let cfg = AnalysisConfig {
            item_count: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(AnalysisError::InvalidConfig(_))));

        let cfg = AnalysisConfig {
            history_window_days: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn debug_output_hides_notification_key() {
        let cfg = AnalysisConfig {
            notification_key: "PDU-secret".to_string(),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("PDU-secret"));
    }
}
