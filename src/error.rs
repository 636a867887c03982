use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Daily partner quota reached, try again tomorrow")]
    QuotaExceeded,

    #[error("No current partner, request a partner first")]
    NoCurrentPartner,

    #[error("Partner already liked")]
    AlreadyLiked,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures of the backing store or cache
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Cache(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::NoCurrentPartner => StatusCode::BAD_REQUEST,
            AppError::AlreadyLiked => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
