use analysis_core::{AnalysisError, BacktestSummary, CompanyProfile, Entity, Frequency, Period};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use fundamental_analysis::{ComparisonTable, FundamentalAnalysisEngine, FundamentalReport};
use market_data::parse_ticker_input;
use portfolio_analysis::{
    OptimizationContext, OptimizationPerformance, OptimizationReport, StrategyAnalyzer, StrategyReport,
    WeightedAsset,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use technical_analysis::{TechnicalAnalysisEngine, TechnicalReport};
use tokio::task::JoinSet;

use crate::session::SessionId;
use crate::{ApiResponse, AppError, AppState};

pub const INSUFFICIENT_HISTORY_WARNING: &str =
    "Datos históricos insuficientes para calcular todos los indicadores; la señal puede ser indeterminada.";

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports/fundamental", post(fundamental_report))
        .route("/api/reports/fundamental.csv", get(download_fundamental_table))
        .route("/api/reports/optimization", post(optimization_report))
        .route("/api/reports/strategy", post(strategy_report))
        .route("/api/reports/technical", post(technical_report))
}

/// Fetch profiles concurrently; failed or unknown tickers are left out.
async fn fetch_profiles(state: &AppState, tickers: &[String]) -> HashMap<String, CompanyProfile> {
    let mut tasks = JoinSet::new();
    for ticker in tickers.iter().cloned() {
        let provider = Arc::clone(&state.provider);
        tasks.spawn(async move {
            let result = provider.profile(&ticker).await;
            (ticker, result)
        });
    }

    let mut profiles = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((ticker, Ok(Some(profile)))) => {
                profiles.insert(ticker, profile);
            }
            Ok((ticker, Ok(None))) => tracing::debug!("No profile for {}", ticker),
            Ok((ticker, Err(e))) => tracing::warn!("Failed to fetch profile for {}: {}", ticker, e),
            Err(e) => tracing::error!("Task error: {}", e),
        }
    }
    profiles
}

// ---------------------------------------------------------------------------
// Fundamental
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct FundamentalRequest {
    pub tickers: String,
}

#[derive(Serialize)]
pub struct FundamentalResponse {
    #[serde(flatten)]
    pub report: FundamentalReport,
    /// Tickers whose data could not be retrieved.
    pub unavailable: Vec<String>,
}

#[derive(Deserialize)]
pub struct FundamentalQuery {
    pub tickers: String,
}

/// Fetch fundamentals concurrently. Returns the retrieved entities and the tickers that
/// could not be retrieved, both in input order.
async fn fetch_entities(state: &AppState, raw_tickers: &str) -> Result<(Vec<Entity>, Vec<String>), AppError> {
    let tickers = parse_ticker_input(raw_tickers);
    if tickers.is_empty() {
        return Err(AppError::bad_request("Por favor, ingrese al menos un ticker válido."));
    }

    let mut tasks = JoinSet::new();
    for (index, ticker) in tickers.iter().cloned().enumerate() {
        let provider = Arc::clone(&state.provider);
        tasks.spawn(async move {
            let result = provider.fundamentals(&ticker).await;
            (index, ticker, result)
        });
    }

    let mut fetched: Vec<(usize, Entity)> = Vec::new();
    let mut unavailable: Vec<(usize, String)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(Some(fundamentals)))) => fetched.push((index, fundamentals.into())),
            Ok((index, ticker, Ok(None))) => unavailable.push((index, ticker)),
            Ok((index, ticker, Err(e))) => {
                tracing::warn!("Failed to fetch fundamentals for {}: {}", ticker, e);
                unavailable.push((index, ticker));
            }
            Err(e) => tracing::error!("Task error: {}", e),
        }
    }
    fetched.sort_by_key(|(index, _)| *index);
    unavailable.sort_by_key(|(index, _)| *index);

    Ok((
        fetched.into_iter().map(|(_, e)| e).collect(),
        unavailable.into_iter().map(|(_, t)| t).collect(),
    ))
}

async fn fundamental_report(
    State(state): State<AppState>,
    Json(req): Json<FundamentalRequest>,
) -> Result<Json<ApiResponse<FundamentalResponse>>, AppError> {
    let (entities, unavailable) = fetch_entities(&state, &req.tickers).await?;
    let report = FundamentalAnalysisEngine::new().analyze(&entities)?;
    tracing::info!("Fundamental report for {} companies", entities.len());

    Ok(Json(ApiResponse::success(FundamentalResponse { report, unavailable })))
}

/// Comparison table of the retrieved companies as a CSV attachment.
async fn download_fundamental_table(
    State(state): State<AppState>,
    Query(query): Query<FundamentalQuery>,
) -> Result<Response, AppError> {
    let (entities, _) = fetch_entities(&state, &query.tickers).await?;
    if entities.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "No se pudieron obtener datos para ninguno de los tickers seleccionados.".to_string(),
        )
        .into());
    }

    let table = ComparisonTable::from_entities(&entities);
    let mut body = Vec::new();
    table
        .write_csv(&mut body)
        .map_err(|e| anyhow::anyhow!("Failed to write comparison CSV: {}", e))?;
    tracing::info!("Exported comparison table for {} companies", table.entity_count());

    let disposition = format!("attachment; filename=\"comparativa_{}.csv\"", table.tickers.join("_"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Optimization
// ---------------------------------------------------------------------------

/// Output of the external max-Sharpe optimizer for the session's tickers.
#[derive(Deserialize)]
pub struct OptimizationRequest {
    pub weights: Vec<WeightedAsset>,
    pub performance: OptimizationPerformance,
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    pub period: Option<Period>,
    pub frequency: Option<Frequency>,
    pub risk_free_rate_percent: Option<f64>,
}

#[derive(Serialize)]
pub struct OptimizationResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub report: OptimizationReport,
}

async fn optimization_report(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(req): Json<OptimizationRequest>,
) -> Result<Json<ApiResponse<OptimizationResponse>>, AppError> {
    let mut weights = req.weights;
    for asset in &mut weights {
        asset.ticker = asset.ticker.trim().to_uppercase();
    }
    let mut tickers: Vec<String> = Vec::with_capacity(weights.len());
    for asset in &weights {
        if asset.ticker.is_empty() {
            return Err(AppError::bad_request("Los pesos incluyen un ticker vacío."));
        }
        if tickers.contains(&asset.ticker) {
            return Err(AppError::bad_request(format!("Ticker duplicado en los pesos: {}", asset.ticker)));
        }
        tickers.push(asset.ticker.clone());
    }

    let mut names: BTreeMap<String, String> = req
        .names
        .into_iter()
        .map(|(ticker, name)| (ticker.trim().to_uppercase(), name))
        .filter(|(ticker, _)| tickers.contains(ticker))
        .collect();
    let unnamed: Vec<String> = tickers.iter().filter(|t| !names.contains_key(*t)).cloned().collect();
    if !unnamed.is_empty() {
        let profiles = fetch_profiles(&state, &unnamed).await;
        for ticker in unnamed {
            let name = profiles
                .get(&ticker)
                .and_then(|p| p.long_name.clone())
                .unwrap_or_else(|| ticker.clone());
            names.insert(ticker, name);
        }
    }

    let context = OptimizationContext {
        tickers,
        names,
        weights,
        period: req.period.unwrap_or(state.config.default_period),
        frequency: req.frequency.unwrap_or(state.config.default_frequency),
        risk_free_rate: req
            .risk_free_rate_percent
            .map(|p| p / 100.0)
            .unwrap_or_else(|| state.config.risk_free_rate()),
        performance: req.performance,
        created_at: Utc::now(),
    };
    context.validate()?;

    let report = OptimizationReport::from_context(&context);
    state.sessions.insert(&session, context);
    tracing::info!("Stored optimization context for session {}", session.0);

    Ok(Json(ApiResponse::success(OptimizationResponse {
        session_id: session.0,
        report,
    })))
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Backtest statistics from the external engine. With `monthly` set, volatility and
/// Sharpe are monthly figures and get annualised.
#[derive(Deserialize)]
pub struct BacktestInput {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    #[serde(default)]
    pub monthly: bool,
}

impl BacktestInput {
    fn into_summary(self) -> BacktestSummary {
        if self.monthly {
            BacktestSummary::from_monthly(self.total_return, self.volatility, self.max_drawdown, self.sharpe_ratio)
        } else {
            BacktestSummary {
                total_return: self.total_return,
                annual_volatility: self.volatility,
                max_drawdown: self.max_drawdown,
                sharpe_ratio: self.sharpe_ratio,
            }
        }
    }
}

#[derive(Deserialize)]
pub struct StrategyRequest {
    pub backtest: BacktestInput,
    pub initial_capital: Option<f64>,
}

async fn strategy_report(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(req): Json<StrategyRequest>,
) -> Result<Json<ApiResponse<StrategyReport>>, AppError> {
    let context = state.sessions.get(&session).ok_or_else(AppError::missing_optimization)?;
    if !context.has_allocation() {
        return Err(AppError::missing_optimization());
    }

    let profiles = fetch_profiles(&state, &context.tickers).await;
    let sectors: HashMap<String, String> = profiles
        .into_iter()
        .filter_map(|(ticker, profile)| profile.sector.map(|s| (ticker, s)))
        .collect();

    let capital = req.initial_capital.unwrap_or(state.config.initial_capital);
    let report = StrategyAnalyzer::new(capital).analyze(&context, &sectors, req.backtest.into_summary())?;
    tracing::info!("Strategy report for session {}", session.0);

    Ok(Json(ApiResponse::success(report)))
}

// ---------------------------------------------------------------------------
// Technical
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TechnicalEntry {
    pub name: String,
    pub weight: f64,
    #[serde(flatten)]
    pub report: TechnicalReport,
    pub warning: Option<String>,
}

async fn technical_report(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<ApiResponse<Vec<TechnicalEntry>>>, AppError> {
    let context = state.sessions.get(&session).ok_or_else(AppError::missing_optimization)?;
    let allocated: Vec<WeightedAsset> = context.allocated().cloned().collect();
    if allocated.is_empty() {
        return Err(AppError::missing_optimization());
    }

    let mut tasks = JoinSet::new();
    for (index, asset) in allocated.iter().enumerate() {
        let provider = Arc::clone(&state.provider);
        let ticker = asset.ticker.clone();
        let (period, frequency) = (context.period, context.frequency);
        tasks.spawn(async move {
            let result = provider.closes(&ticker, period, frequency).await;
            (index, ticker, result)
        });
    }

    let mut histories = vec![Vec::new(); allocated.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(points))) => histories[index] = points,
            Ok((_, ticker, Err(e))) => tracing::warn!("Failed to fetch closes for {}: {}", ticker, e),
            Err(e) => tracing::error!("Task error: {}", e),
        }
    }

    let engine = TechnicalAnalysisEngine::new();
    let entries = allocated
        .into_iter()
        .zip(histories)
        .map(|(asset, history)| {
            let report = engine.analyze(&asset.ticker, &history);
            TechnicalEntry {
                name: context.name_of(&asset.ticker).to_string(),
                warning: report
                    .insufficient_history
                    .then(|| INSUFFICIENT_HISTORY_WARNING.to_string()),
                weight: asset.weight,
                report,
            }
        })
        .collect();

    Ok(Json(ApiResponse::success(entries)))
}
