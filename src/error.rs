use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(config::ConfigError),
    InvalidState,
    Unauthorized(String),
    TokenExchange(String),
    Upstream(String),
    Validation(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "Configuration error: {err}"),
            AppError::InvalidState => write!(f, "Invalid or already used state token"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::TokenExchange(detail) => write!(f, "Token exchange failed: {detail}"),
            AppError::Upstream(detail) => write!(f, "Upstream request failed: {detail}"),
            AppError::Validation(msg) => write!(f, "Validation error: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Upstream and internal details stay in the server log; clients only
        // ever see the generic message for those variants.
        let (status, message) = match &self {
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
            ),
            AppError::InvalidState => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired state".to_string(),
            ),
            AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired session".to_string(),
            ),
            AppError::TokenExchange(_) => {
                (StatusCode::BAD_REQUEST, "Token exchange failed".to_string())
            }
            AppError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "Upstream request failed".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        match &self {
            AppError::Config(_) | AppError::Internal(_) => tracing::error!("{self}"),
            AppError::TokenExchange(_) | AppError::Upstream(_) => tracing::warn!("{self}"),
            _ => {}
        }

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}
