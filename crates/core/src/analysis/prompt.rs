pub const DISCLAIMER: &str = "AI-generated. For informational purposes only. Not investment advice.";

#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub news_text: &'a str,
    pub watchlist: &'a [String],
    pub item_count: usize,
    pub history_window_days: u32,
}

fn output_schema() -> String {
    [
        "{",
        "  \"analysisDate\": \"YYYY-MM-DD\",",
        "  \"identifiedStocks\": [",
        "    {",
        "      \"ticker\": \"string\",",
        "      \"relevanceExplanation\": \"string\",",
        "      \"supportingSnippet\": \"string\",",
        "      \"hypotheticalPrice\": \"$XXX.XX\",",
        "      \"hypotheticalTrend\": \"string\"",
        "    }",
        "  ],",
        "  \"otherRelevantStocks\": [",
        "    {",
        "      \"ticker\": \"string\",",
        "      \"reason\": \"string\"",
        "    }",
        "  ],",
        "  \"notificationDraft\": \"string\"",
        "}",
    ]
    .join("\n")
}

pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let watchlist = input.watchlist.join(", ");
    let schema = output_schema();

    format!(
        "You are an expert financial news analyst.\n\
Analyze the news text below against the watchlist and parameters.\n\
---\n\
News Text:\n{news}\n\
---\n\
Watchlist Stock Tickers: {watchlist}\n\
Approximate Number of News Items Context: {items}\n\
Historical Trend Period to Consider (days): {days}\n\
---\n\n\
Tasks:\n\
1. Identify which watchlist stocks are directly mentioned or strongly implied by the news.\n\
2. For each identified stock give: the ticker; a brief explanation of its relevance; a key quote or snippet from the news supporting it; \
a plausible hypothetical current price formatted like \"$XXX.XX\"; a brief qualitative description of its hypothetical recent price trend \
over the last {days} days (e.g. \"steady upward trend\", \"volatile with downward pressure\", \"sideways trading\").\n\
3. Suggest at most 2 other tickers not on the watchlist that the news may also affect, each with a brief reason.\n\
4. Write a concise push-notification message summarizing the key findings for the most relevant watchlist stock(s). \
It MUST include this disclaimer verbatim: \"{disclaimer}\"\n\
5. Give today's date as analysisDate in YYYY-MM-DD format.\n\n\
Output schema:\n{schema}\n\n\
Rules:\n\
- If no watchlist stock is relevant, identifiedStocks MUST be an empty array.\n\
- otherRelevantStocks MUST have at most 2 entries.\n\
- If the news text is too short or irrelevant, say so in notificationDraft.\n\
- Escape all string values correctly for JSON.\n\
- Respond with the JSON object only. No commentary, no markdown, nothing before or after it.",
        news = input.news_text,
        watchlist = watchlist,
        items = input.item_count,
        days = input.history_window_days,
        disclaimer = DISCLAIMER,
        schema = schema,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_inputs_rules_and_schema() {
        let watchlist = vec!["AAPL".to_string(), "msft".to_string()];
        let prompt = build_prompt(&PromptInput {
            news_text: "Title: Apple beats\nSummary: record...",
            watchlist: &watchlist,
            item_count: 5,
            history_window_days: 14,
        });

        assert!(prompt.contains("Title: Apple beats"));
        assert!(prompt.contains("Watchlist Stock Tickers: AAPL, msft"));
        assert!(prompt.contains("News Items Context: 5"));
        assert!(prompt.contains("(days): 14"));
        assert!(prompt.contains(DISCLAIMER));
        assert!(prompt.contains("at most 2"));
        assert!(prompt.contains("empty array"));
        for key in [
            "analysisDate",
            "identifiedStocks",
            "relevanceExplanation",
            "supportingSnippet",
            "hypotheticalPrice",
            "hypotheticalTrend",
            "otherRelevantStocks",
            "notificationDraft",
        ] {
            assert!(prompt.contains(key), "missing {key}");
        }
    }
}
