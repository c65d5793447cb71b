use crate::domain::contract::{LlmAnalysisReport, Normalized};
use anyhow::Context;
use chrono::NaiveDate;

/// Removes one surrounding markdown fence (```` ``` ```` or ```` ```json ````), if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|s| s.strip_suffix("```"))
    else {
        return trimmed;
    };

    let inner = inner.strip_prefix("json").unwrap_or(inner).trim();
    if inner.is_empty() {
        trimmed
    } else {
        inner
    }
}

pub fn parse_report(text: &str, today: NaiveDate) -> anyhow::Result<Normalized> {
    let json_str = strip_code_fence(text);
    let value = serde_json::from_str::<serde_json::Value>(json_str)
        .context("model output is not valid JSON")?;
    Ok(LlmAnalysisReport::from_value(value).normalize(today))
}
