use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysisReport {
    pub analysis_date: String,
    pub identified_stocks: Vec<IdentifiedStock>,
    pub other_relevant_stocks: Vec<OtherRelevantStock>,
    pub notification_draft: String,

    /// The text actually sent to the model, prefixed with the feed status note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_news_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchlist_used: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedStock {
    pub ticker: String,
    pub relevance_explanation: String,
    pub supporting_snippet: String,
    pub hypothetical_price: String,
    pub hypothetical_trend: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherRelevantStock {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    /// Keyword match on the model's free-text trend description.
    pub fn classify(trend: &str) -> Self {
        let lower = trend.to_lowercase();
        if ["up", "rise", "recover"].iter().any(|k| lower.contains(k)) {
            Self::Up
        } else if ["down", "dip", "drop"].iter().any(|k| lower.contains(k)) {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

impl IdentifiedStock {
    pub fn trend_direction(&self) -> TrendDirection {
        TrendDirection::classify(&self.hypothetical_trend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_trend_keywords() {
        assert_eq!(TrendDirection::classify("steady upward trend"), TrendDirection::Up);
        assert_eq!(TrendDirection::classify("Showing signs of RECOVERY"), TrendDirection::Up);
        assert_eq!(
            TrendDirection::classify("volatile, sharp drop after earnings"),
            TrendDirection::Down
        );
        assert_eq!(TrendDirection::classify("sideways trading"), TrendDirection::Flat);
    }

    #[test]
    fn serializes_with_camel_case_keys_and_skips_absent_optionals() {
        let report = StockAnalysisReport {
            analysis_date: "2026-01-27".to_string(),
            identified_stocks: vec![],
            other_relevant_stocks: vec![OtherRelevantStock {
                ticker: "NVDA".to_string(),
                reason: "supplier".to_string(),
            }],
            notification_draft: "draft".to_string(),
            raw_news_input: None,
            watchlist_used: None,
        };

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["analysisDate"], "2026-01-27");
        assert_eq!(v["otherRelevantStocks"][0]["ticker"], "NVDA");
        assert!(v.get("rawNewsInput").is_none());
        assert!(v.get("watchlistUsed").is_none());
    }
}
