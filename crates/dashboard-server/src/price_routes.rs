use analysis_core::{Frequency, Period};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use market_data::fetch_price_table;
use serde::Deserialize;
use std::sync::Arc;

use crate::ticker_routes::resolve_tickers;
use crate::{AppError, AppState};

#[derive(Deserialize)]
pub struct PriceQuery {
    pub tickers: String,
    pub period: Option<String>,
    pub frequency: Option<String>,
}

pub fn price_routes() -> Router<AppState> {
    Router::new().route("/api/prices.csv", get(download_prices))
}

/// Closing prices of the valid tickers as a CSV attachment.
async fn download_prices(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<Response, AppError> {
    let period = match query.period.as_deref() {
        Some(raw) => Period::parse(raw).ok_or_else(|| AppError::bad_request(format!("Período no válido: {}", raw)))?,
        None => state.config.default_period,
    };
    let frequency = match query.frequency.as_deref() {
        Some(raw) => {
            Frequency::parse(raw).ok_or_else(|| AppError::bad_request(format!("Frecuencia no válida: {}", raw)))?
        }
        None => state.config.default_frequency,
    };

    let tickers = resolve_tickers(&state, &query.tickers).await?.tickers();
    let table = fetch_price_table(Arc::clone(&state.provider), &tickers, period, frequency).await?;
    if table.is_empty() {
        return Err(AppError::new(
            axum::http::StatusCode::NOT_FOUND,
            "No se pudieron descargar los datos de precios.",
        ));
    }

    let mut body = Vec::new();
    table
        .write_csv(&mut body)
        .map_err(|e| anyhow::anyhow!("Failed to write prices CSV: {}", e))?;
    tracing::info!("Exported {} price rows for {}", table.rows.len(), tickers.join(", "));

    let disposition = format!("attachment; filename=\"precios_{}.csv\"", tickers.join("_"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
