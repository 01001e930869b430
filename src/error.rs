use crate::models::GenerateResponse;
use crate::services::providers::ProviderError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    MalformedRequest(String),

    #[error("{0}")]
    Upstream(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

/// Every failure leaves the handler as the same `{status, response}` envelope
/// callers get on success, just with `status: "error"`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::MalformedRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // The provider's own message is the most useful thing we can
            // relay; callers see bad credentials, quota and model errors
            // verbatim.
            AppError::Upstream(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::Config(ref err) | AppError::Internal(ref err) => {
                tracing::error!("Unexpected error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        (status, Json(GenerateResponse::error(message))).into_response()
    }
}
