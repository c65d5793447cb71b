use anyhow::Context;
use clap::builder::TypedValueParser;
use clap::{Parser, ValueEnum};
use stocknews_core::analysis::Analyzer;
use stocknews_core::domain::request::{
    AnalysisConfig, DEFAULT_HISTORY_WINDOW_DAYS, DEFAULT_ITEM_COUNT,
};
use stocknews_core::feed::NewsFetcher;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "stocknews", about = "Analyze stock news for a watchlist with an LLM")]
struct Args {
    /// RSS or Atom feed URL to pull news from.
    #[arg(long, default_value = "")]
    feed_url: String,

    /// Comma-separated tickers, e.g. "AAPL, MSFT, GOOG".
    #[arg(long, default_value = "")]
    watchlist: String,

    /// Push notification key. Kept with the request, not used for delivery.
    #[arg(long, default_value = "")]
    notification_key: String,

    /// Maximum number of feed items to analyze.
    #[arg(long, default_value_t = DEFAULT_ITEM_COUNT, value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
    item_count: usize,

    /// Price-history window in days the model should consider.
    #[arg(long = "history-days", default_value_t = DEFAULT_HISTORY_WINDOW_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
    history_window_days: u32,

    /// News text entered by hand. Combined with the feed digest when both are present.
    #[arg(long, default_value = "", conflicts_with = "manual_text_file")]
    manual_text: String,

    /// Read manual news text from a file ("-" for stdin).
    #[arg(long)]
    manual_text_file: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stocknews_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let manual_text = match args.manual_text_file.as_deref() {
        Some(path) => read_manual_text(path)?,
        None => args.manual_text.clone(),
    };

    let config = AnalysisConfig {
        feed_url: args.feed_url,
        watchlist: args.watchlist,
        notification_key: args.notification_key,
        item_count: args.item_count,
        history_window_days: args.history_window_days,
        manual_text,
    };

    let llm = stocknews_core::llm::client_from_settings(&settings)?;
    let analyzer = Analyzer::new(NewsFetcher::from_settings(&settings), llm);

    match analyzer.analyze(&config).await {
        Ok(report) => {
            let out = match args.format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Text => render::render_report(&report),
            };
            println!("{out}");
            Ok(())
        }
        Err(err) => {
            tracing::error!(kind = err.kind(), error = %err, "analysis failed");
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            Err(err)
        }
    }
}

fn read_manual_text(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        return std::io::read_to_string(std::io::stdin()).context("failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
}

fn init_sentry(settings: &stocknews_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
