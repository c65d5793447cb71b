use std::fmt::Write;
use stocknews_core::domain::report::{StockAnalysisReport, TrendDirection};

const RAW_INPUT_PREVIEW_CHARS: usize = 300;

pub fn render_report(report: &StockAnalysisReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, report);
    out.trim_end().to_string()
}

fn write_report(out: &mut String, report: &StockAnalysisReport) -> std::fmt::Result {
    writeln!(out, "AI Analysis Report")?;
    writeln!(out, "Analysis Date: {}", report.analysis_date)?;

    if let Some(raw) = report.raw_news_input.as_deref().filter(|s| !s.is_empty()) {
        writeln!(out, "\n== Original News Input Snippet ==")?;
        writeln!(out, "{}", preview(raw, RAW_INPUT_PREVIEW_CHARS))?;
    }

    if let Some(watchlist) = report.watchlist_used.as_ref().filter(|w| !w.is_empty()) {
        writeln!(out, "\n== Watchlist Used for Analysis ==")?;
        writeln!(out, "{}", watchlist.join(", "))?;
    }

    writeln!(out, "\n== Identified Stocks from Watchlist ==")?;
    if report.identified_stocks.is_empty() {
        writeln!(
            out,
            "No relevant stocks identified from your watchlist in the provided news."
        )?;
    }
    for stock in &report.identified_stocks {
        writeln!(out, "\n[{}]", stock.ticker)?;
        writeln!(out, "  Price (Hypothetical): {}", stock.hypothetical_price)?;
        writeln!(
            out,
            "  Trend (Hypothetical): {} {}",
            trend_marker(stock.trend_direction()),
            stock.hypothetical_trend
        )?;
        writeln!(out, "  Relevance: {}", stock.relevance_explanation)?;
        writeln!(out, "  Supporting Snippet: \"{}\"", stock.supporting_snippet)?;
    }

    if !report.other_relevant_stocks.is_empty() {
        writeln!(out, "\n== Other Potentially Relevant Stocks ==")?;
        for stock in &report.other_relevant_stocks {
            writeln!(out, "- {}: {}", stock.ticker, stock.reason)?;
        }
    }

    writeln!(out, "\n== Generated Notification Draft ==")?;
    writeln!(out, "{}", report.notification_draft)
}

fn trend_marker(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Up => "▲",
        TrendDirection::Down => "▼",
        TrendDirection::Flat => "▬",
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
