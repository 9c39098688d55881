pub mod config;
mod error;
mod price_routes;
mod report_routes;
pub mod session;
mod ticker_routes;

#[cfg(test)]
mod route_tests;

use std::sync::Arc;

use analysis_core::{Frequency, MarketDataProvider, Period};
use axum::{
    extract::State,
    http::HeaderName,
    middleware,
    routing::get,
    Json, Router,
};
use market_data::YahooFinanceClient;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::DashboardConfig;
pub use error::{ApiResponse, AppError};
pub use session::{SessionId, SessionStore, SESSION_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub provider: Arc<dyn MarketDataProvider>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: DashboardConfig, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    sessions: usize,
}

#[derive(Serialize)]
struct DefaultsResponse {
    tickers: String,
    period: Period,
    frequency: Frequency,
    risk_free_rate_percent: f64,
    initial_capital: f64,
    periods: [Period; 5],
    frequencies: [Frequency; 2],
}

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.sessions.len(),
    }))
}

/// Sidebar defaults.
async fn defaults(State(state): State<AppState>) -> Json<ApiResponse<DefaultsResponse>> {
    let config = &state.config;
    Json(ApiResponse::success(DefaultsResponse {
        tickers: config.default_tickers.clone(),
        period: config.default_period,
        frequency: config.default_frequency,
        risk_free_rate_percent: config.risk_free_rate_percent,
        initial_capital: config.initial_capital,
        periods: [
            Period::OneYear,
            Period::TwoYears,
            Period::FiveYears,
            Period::TenYears,
            Period::Max,
        ],
        frequencies: [Frequency::Daily, Frequency::Monthly],
    }))
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(SESSION_HEADER)]);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/defaults", get(defaults))
        .merge(ticker_routes::ticker_routes())
        .merge(report_routes::report_routes())
        .merge(price_routes::price_routes())
        .layer(middleware::from_fn(session::session_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server(config: DashboardConfig) -> anyhow::Result<()> {
    let provider = YahooFinanceClient::new(config.yahoo_base_url.clone(), config.request_timeout())?;
    let bind_addr = config.bind_addr;
    let state = AppState::new(config, Arc::new(provider));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Analytix dashboard listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
