//! Loose shape of the model's JSON and its normalization into a report.
//!
//! The model is asked for an exact schema but nothing is trusted: every leaf is
//! coalesced independently, so a partially broken response still yields a
//! report whose string fields are all non-empty.

use crate::domain::report::{IdentifiedStock, OtherRelevantStock, StockAnalysisReport};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

pub const PLACEHOLDER_TICKER: &str = "N/A";
pub const PLACEHOLDER_RELEVANCE: &str = "No explanation provided.";
pub const PLACEHOLDER_SNIPPET: &str = "No snippet provided.";
pub const PLACEHOLDER_PRICE: &str = "$0.00";
pub const PLACEHOLDER_TREND: &str = "Trend not analyzed.";
pub const PLACEHOLDER_REASON: &str = "No reason provided.";
pub const PLACEHOLDER_NOTIFICATION: &str = "No notification generated.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmAnalysisReport {
    pub analysis_date: Option<Value>,
    pub identified_stocks: Option<Value>,
    pub other_relevant_stocks: Option<Value>,
    pub notification_draft: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmIdentifiedStock {
    pub ticker: Option<Value>,
    pub relevance_explanation: Option<Value>,
    pub supporting_snippet: Option<Value>,
    pub hypothetical_price: Option<Value>,
    pub hypothetical_trend: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmOtherRelevantStock {
    pub ticker: Option<Value>,
    pub reason: Option<Value>,
}

/// A normalized report plus how many leaves fell back to a placeholder.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub report: StockAnalysisReport,
    pub defaulted_fields: usize,
}

/// Text value of a leaf, or `None` when it is absent or falsy.
///
/// Strings are trimmed and must be non-empty; numbers are rendered as-is.
/// Everything else (null, bool, arrays, objects) counts as missing.
pub fn coalesce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Like [`coalesce_text`], but numeric prices are rendered as `$X.XX`.
pub fn coalesce_price(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => n.as_f64().map(|p| format!("${p:.2}")),
        other => coalesce_text(Some(other)),
    }
}

impl LlmAnalysisReport {
    /// Non-object input (an array, a bare string) is treated as an empty object.
    pub fn from_value(value: Value) -> Self {
        if value.is_object() {
            serde_json::from_value(value).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    pub fn normalize(self, today: NaiveDate) -> Normalized {
        let mut defaults = Defaults::default();

        let analysis_date = defaults.or(
            coalesce_text(self.analysis_date.as_ref()),
            || today.format("%Y-%m-%d").to_string(),
        );

        let identified_stocks = entries(self.identified_stocks)
            .into_iter()
            .map(|v| entry::<LlmIdentifiedStock>(v).into_stock(&mut defaults))
            .collect();

        let other_relevant_stocks = entries(self.other_relevant_stocks)
            .into_iter()
            .map(|v| entry::<LlmOtherRelevantStock>(v).into_stock(&mut defaults))
            .collect();

        let notification_draft = defaults.text(
            coalesce_text(self.notification_draft.as_ref()),
            PLACEHOLDER_NOTIFICATION,
        );

        Normalized {
            report: StockAnalysisReport {
                analysis_date,
                identified_stocks,
                other_relevant_stocks,
                notification_draft,
                raw_news_input: None,
                watchlist_used: None,
            },
            defaulted_fields: defaults.count,
        }
    }
}

impl LlmIdentifiedStock {
    fn into_stock(self, defaults: &mut Defaults) -> IdentifiedStock {
        IdentifiedStock {
            ticker: defaults.text(coalesce_text(self.ticker.as_ref()), PLACEHOLDER_TICKER),
            relevance_explanation: defaults.text(
                coalesce_text(self.relevance_explanation.as_ref()),
                PLACEHOLDER_RELEVANCE,
            ),
            supporting_snippet: defaults.text(
                coalesce_text(self.supporting_snippet.as_ref()),
                PLACEHOLDER_SNIPPET,
            ),
            hypothetical_price: defaults.text(
                coalesce_price(self.hypothetical_price.as_ref()),
                PLACEHOLDER_PRICE,
            ),
            hypothetical_trend: defaults.text(
                coalesce_text(self.hypothetical_trend.as_ref()),
                PLACEHOLDER_TREND,
            ),
        }
    }
}

impl LlmOtherRelevantStock {
    fn into_stock(self, defaults: &mut Defaults) -> OtherRelevantStock {
        OtherRelevantStock {
            ticker: defaults.text(coalesce_text(self.ticker.as_ref()), PLACEHOLDER_TICKER),
            reason: defaults.text(coalesce_text(self.reason.as_ref()), PLACEHOLDER_REASON),
        }
    }
}

#[derive(Default)]
struct Defaults {
    count: usize,
}

impl Defaults {
    fn or(&mut self, value: Option<String>, fallback: impl FnOnce() -> String) -> String {
        value.unwrap_or_else(|| {
            self.count += 1;
            fallback()
        })
    }

    fn text(&mut self, value: Option<String>, placeholder: &str) -> String {
        self.or(value, || placeholder.to_string())
    }
}

fn entries(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn entry<T: Default + for<'de> Deserialize<'de>>(value: Value) -> T {
    if value.is_object() {
        serde_json::from_value(value).unwrap_or_default()
    } else {
        T::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 27).unwrap()
    }

    #[test]
    fn complete_response_passes_through_untouched() {
        let v = json!({
            "analysisDate": "2026-01-26",
            "identifiedStocks": [{
                "ticker": "AAPL",
                "relevanceExplanation": "Supplier news",
                "supportingSnippet": "Apple said...",
                "hypotheticalPrice": "$190.12",
                "hypotheticalTrend": "steady upward trend"
            }],
            "otherRelevantStocks": [{"ticker": "TSM", "reason": "Chip supplier"}],
            "notificationDraft": "AAPL up. AI-generated."
        });

        let out = LlmAnalysisReport::from_value(v).normalize(today());
        assert_eq!(out.defaulted_fields, 0);
        assert_eq!(out.report.analysis_date, "2026-01-26");
        assert_eq!(out.report.identified_stocks[0].ticker, "AAPL");
        assert_eq!(out.report.identified_stocks[0].hypothetical_price, "$190.12");
        assert_eq!(out.report.other_relevant_stocks[0].reason, "Chip supplier");
    }

    #[test]
    fn missing_notification_draft_gets_placeholder() {
        let v = json!({
            "analysisDate": "2026-01-26",
            "identifiedStocks": [],
            "otherRelevantStocks": []
        });
        let out = LlmAnalysisReport::from_value(v).normalize(today());
        assert_eq!(out.report.notification_draft, PLACEHOLDER_NOTIFICATION);
        assert_eq!(out.defaulted_fields, 1);
    }

    #[test]
    fn inner_fields_default_independently() {
        let v = json!({
            "identifiedStocks": [{"ticker": "MSFT", "hypotheticalPrice": "", "hypotheticalTrend": null}],
            "otherRelevantStocks": [{"reason": "Cloud peer"}]
        });
        let out = LlmAnalysisReport::from_value(v).normalize(today());
        let stock = &out.report.identified_stocks[0];
        assert_eq!(stock.ticker, "MSFT");
        assert_eq!(stock.relevance_explanation, PLACEHOLDER_RELEVANCE);
        assert_eq!(stock.supporting_snippet, PLACEHOLDER_SNIPPET);
        assert_eq!(stock.hypothetical_price, PLACEHOLDER_PRICE);
        assert_eq!(stock.hypothetical_trend, PLACEHOLDER_TREND);

        let other = &out.report.other_relevant_stocks[0];
        assert_eq!(other.ticker, PLACEHOLDER_TICKER);
        assert_eq!(other.reason, "Cloud peer");

        assert_eq!(out.report.analysis_date, "2026-01-27");
        assert_eq!(out.report.notification_draft, PLACEHOLDER_NOTIFICATION);
    }

    #[test]
    fn non_array_lists_and_non_object_entries_are_tolerated() {
        let v = json!({
            "identifiedStocks": "AAPL",
            "otherRelevantStocks": [null, "TSLA"],
            "notificationDraft": "ok"
        });
        let out = LlmAnalysisReport::from_value(v).normalize(today());
        assert!(out.report.identified_stocks.is_empty());
        assert_eq!(out.report.other_relevant_stocks.len(), 2);
        assert!(out
            .report
            .other_relevant_stocks
            .iter()
            .all(|s| s.ticker == PLACEHOLDER_TICKER && s.reason == PLACEHOLDER_REASON));
    }

    #[test]
    fn non_object_top_level_yields_fully_defaulted_report() {
        let out = LlmAnalysisReport::from_value(json!([1, 2, 3])).normalize(today());
        assert_eq!(out.report.analysis_date, "2026-01-27");
        assert!(out.report.identified_stocks.is_empty());
        assert!(out.report.other_relevant_stocks.is_empty());
        assert_eq!(out.report.notification_draft, PLACEHOLDER_NOTIFICATION);
    }

    #[test]
    fn numeric_leaves_are_rendered() {
        let v = json!({
            "identifiedStocks": [{"ticker": 7203, "hypotheticalPrice": 187.5}]
        });
        let out = LlmAnalysisReport::from_value(v).normalize(today());
        assert_eq!(out.report.identified_stocks[0].ticker, "7203");
        assert_eq!(out.report.identified_stocks[0].hypothetical_price, "$187.50");
    }

    #[test]
    fn whitespace_only_and_boolean_leaves_are_falsy() {
        assert_eq!(coalesce_text(Some(&json!("   "))), None);
        assert_eq!(coalesce_text(Some(&json!(false))), None);
        assert_eq!(coalesce_text(Some(&json!({"a": 1}))), None);
        assert_eq!(coalesce_text(None), None);
        assert_eq!(coalesce_text(Some(&json!("  AAPL "))), Some("AAPL".to_string()));
    }
}
