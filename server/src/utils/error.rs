//! Unified Error Handling
//!
//! Application-wide error type and response structure. Every route handler
//! returns [`AppResult`]; the [`IntoResponse`] impl is the single translator
//! from internal failures to the wire taxonomy. Database and other internal
//! detail is logged here and never reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::ErrorCode;
use shared::status::{OrderItemStatus, OrderStatus};
use tracing::error;

/// Unified API response structure
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication Errors ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business Logic Errors ==========
    /// Entity absent, or present in another tenant — indistinguishable on
    /// purpose (cross-tenant rows are invisible, not merely forbidden).
    #[error("{1}")]
    NotFound(ErrorCode, String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Illegal order status transition: {from} -> {to}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },

    #[error("Illegal item status transition: {from} -> {to}")]
    InvalidItemTransition {
        from: OrderItemStatus,
        to: OrderItemStatus,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// 422-class business failures carrying their own code
    /// (PRODUCT_UNAVAILABLE, MODIFIER_UNAVAILABLE, ...).
    #[error("{1}")]
    BusinessRule(ErrorCode, String),

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        AppError::InvalidToken(msg.into())
    }

    pub fn not_found(code: ErrorCode, msg: impl Into<String>) -> Self {
        AppError::NotFound(code, msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn business(code: ErrorCode, msg: impl Into<String>) -> Self {
        AppError::BusinessRule(code, msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Stable wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::TokenExpired => ErrorCode::TokenExpired,
            AppError::InvalidToken(_) => ErrorCode::InvalidToken,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::InvalidRefreshToken => ErrorCode::InvalidRefreshToken,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::NotFound(code, _) => *code,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::InvalidOrderTransition { .. } | AppError::InvalidItemTransition { .. } => {
                ErrorCode::InvalidStatusTransition
            }
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::BusinessRule(code, _) => *code,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal detail is logged, a generic message goes out
        let message = match &self {
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(AppResponse::<()> {
            code: code.as_str().to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => {
                AppError::not_found(ErrorCode::NotFound, "Resource not found")
            }
            other => AppError::database(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::validation(e.to_string())
    }
}

/// Result type for handlers and services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_http_status() {
        assert_eq!(AppError::Unauthorized.code().http_status(), 401);
        assert_eq!(
            AppError::not_found(ErrorCode::OrderNotFound, "Order x not found")
                .code()
                .http_status(),
            404
        );
        assert_eq!(
            AppError::business(ErrorCode::ProductUnavailable, "nope")
                .code()
                .http_status(),
            422
        );
        let e = AppError::InvalidOrderTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Served,
        };
        assert_eq!(e.code().http_status(), 409);
    }

    #[test]
    fn database_detail_is_not_leaked() {
        let resp = AppError::database("secret table missing").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
