use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stocknews_core::analysis::Analyzer;
use stocknews_core::domain::report::StockAnalysisReport;
use stocknews_core::domain::request::AnalysisConfig;
use stocknews_core::error::AnalysisError;
use stocknews_core::feed::NewsFetcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stocknews_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Without a usable LLM client the service still starts; /analyze reports why.
    let analyzer = match stocknews_core::llm::client_from_settings(&settings) {
        Ok(llm) => {
            tracing::info!(provider = %llm.provider(), "LLM client ready");
            Ok(Arc::new(Analyzer::new(
                NewsFetcher::from_settings(&settings),
                llm,
            )))
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "LLM client unavailable; starting API in degraded mode");
            Err(e.to_string())
        }
    };

    let app = router(AppState { analyzer });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/analyze", post(analyze))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    /// `Err` holds the startup failure shown to callers.
    analyzer: Result<Arc<Analyzer>, String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

#[derive(Debug)]
enum ApiError {
    Unavailable(String),
    Analysis(AnalysisError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Unavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, "missing_credential", message)
            }
            ApiError::Analysis(err) => {
                let status = match &err {
                    AnalysisError::MissingCredential { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    AnalysisError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
                    AnalysisError::NoContentAvailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    AnalysisError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                };
                (status, err.kind(), err.to_string())
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                kind,
            }),
        )
            .into_response()
    }
}

async fn analyze(
    State(state): State<AppState>,
    Json(config): Json<AnalysisConfig>,
) -> Result<Json<StockAnalysisReport>, ApiError> {
    let analyzer = state.analyzer.map_err(ApiError::Unavailable)?;

    match analyzer.analyze(&config).await {
        Ok(report) => Ok(Json(report)),
        Err(err) => {
            if matches!(err, AnalysisError::Upstream { .. }) {
                sentry_anyhow::capture_anyhow(&anyhow::anyhow!("{err}"));
            }
            tracing::warn!(kind = err.kind(), error = %err, "analysis request failed");
            Err(ApiError::Analysis(err))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
