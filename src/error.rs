use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient credits: have {balance}, need {requested}")]
    InsufficientCredits { requested: i32, balance: i32 },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Generation timed out")]
    GenerationTimeout,

    #[error("AI provider error: {0}")]
    AIProvider(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE",
                    "Storage backend temporarily unavailable, please retry".to_string(),
                    None,
                )
            }
            ApiError::InvalidAmount(ref msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_AMOUNT", msg.clone(), None)
            }
            ApiError::InsufficientCredits { requested, balance } => (
                StatusCode::PAYMENT_REQUIRED,
                "INSUFFICIENT_CREDITS",
                format!("Insufficient credits. Have {}, need {}.", balance, requested),
                Some(json!({ "requested": requested, "balance": balance })),
            ),
            ApiError::AccountNotFound(ref msg) => (
                StatusCode::NOT_FOUND,
                "ACCOUNT_NOT_FOUND",
                msg.clone(),
                None,
            ),
            ApiError::ProviderUnavailable(ref msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "PROVIDER_UNAVAILABLE",
                msg.clone(),
                None,
            ),
            ApiError::GenerationFailed(ref detail) => {
                // Provider error text stays in the logs, not in the response
                tracing::error!("Image generation failed: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "Image generation failed, please try again".to_string(),
                    None,
                )
            }
            ApiError::GenerationTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "GENERATION_TIMEOUT",
                "Image generation timed out, please try again".to_string(),
                None,
            ),
            ApiError::AIProvider(ref msg) => {
                tracing::error!("AI provider error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_PROVIDER_ERROR",
                    "AI service temporarily unavailable".to_string(),
                    None,
                )
            }
            ApiError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            ApiError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::Conflict(ref msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            ApiError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        let body = json!({
            "success": false,
            "error": error,
        });

        (status, Json(body)).into_response()
    }
}

// Helper type for results
pub type Result<T> = std::result::Result<T, ApiError>;
