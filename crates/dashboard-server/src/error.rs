use analysis_core::AnalysisError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error. Status is derived from the wrapped [`AnalysisError`] when there is one.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: anyhow::anyhow!(message.into()),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// A report that builds on the session's last optimization was requested before one ran.
    pub fn missing_optimization() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            "Por favor, primero ejecute una 'Optimización de Portafolio' para poder realizar este análisis.",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn status_for(error: &anyhow::Error) -> StatusCode {
    match error.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::InvalidData(_)) | Some(AnalysisError::InsufficientData(_)) => StatusCode::BAD_REQUEST,
        Some(AnalysisError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(AnalysisError::ApiError(_)) => StatusCode::BAD_GATEWAY,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        Self {
            status: status_for(&error),
            error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.error);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.status, self.error);
        }
        (self.status, Json(ApiResponse::failure(self.error.to_string()))).into_response()
    }
}
