use axum::{extract::State, routing::post, Json, Router};
use market_data::{parse_ticker_input, validate_tickers, TickerValidation};
use serde::Deserialize;
use std::sync::Arc;

use crate::{ApiResponse, AppError, AppState};

pub const NO_VALID_TICKERS: &str = "No hay tickers válidos para analizar.";

#[derive(Deserialize)]
pub struct ValidateTickersRequest {
    /// Comma-separated, as typed in the sidebar.
    pub tickers: String,
}

pub fn ticker_routes() -> Router<AppState> {
    Router::new().route("/api/tickers/validate", post(validate))
}

/// Parse and validate a ticker list. Errors when nothing in it is valid.
pub(crate) async fn resolve_tickers(state: &AppState, input: &str) -> Result<TickerValidation, AppError> {
    let tickers = parse_ticker_input(input);
    if tickers.is_empty() {
        return Err(AppError::bad_request("Por favor, ingrese al menos un ticker válido."));
    }

    let validation = validate_tickers(Arc::clone(&state.provider), &tickers).await;
    if !validation.invalid.is_empty() {
        tracing::warn!("Tickers no encontrados o sin datos: {}", validation.invalid.join(", "));
    }
    if !validation.has_valid() {
        let detail = if validation.invalid.is_empty() {
            NO_VALID_TICKERS.to_string()
        } else {
            format!("{} Tickers no encontrados o sin datos: {}", NO_VALID_TICKERS, validation.invalid.join(", "))
        };
        return Err(AppError::bad_request(detail));
    }
    Ok(validation)
}

async fn validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateTickersRequest>,
) -> Result<Json<ApiResponse<TickerValidation>>, AppError> {
    let validation = resolve_tickers(&state, &req.tickers).await?;
    tracing::info!("Validated tickers: {}", validation.tickers().join(", "));
    Ok(Json(ApiResponse::success(validation)))
}
