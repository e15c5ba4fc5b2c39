//! Stable error codes
//!
//! Machine-readable codes carried in every error response body. Clients
//! branch on the code, never on the human-readable message, so these
//! strings are part of the wire contract and must stay stable.

use serde::{Deserialize, Serialize};

/// Error code taxonomy.
///
/// Grouped by HTTP status class; `http_status` gives the canonical mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 400
    ValidationError,
    // 401
    Unauthorized,
    TokenExpired,
    InvalidToken,
    InvalidCredentials,
    InvalidRefreshToken,
    // 403
    Forbidden,
    // 404
    OrderNotFound,
    OrderItemNotFound,
    ProductNotFound,
    TableNotFound,
    UserNotFound,
    NotFound,
    // 409
    Conflict,
    InvalidStatusTransition,
    // 422
    ProductUnavailable,
    ModifierUnavailable,
    BusinessRule,
    // 500
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::OrderItemNotFound => "ORDER_ITEM_NOT_FOUND",
            ErrorCode::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorCode::TableNotFound => "TABLE_NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            ErrorCode::ProductUnavailable => "PRODUCT_UNAVAILABLE",
            ErrorCode::ModifierUnavailable => "MODIFIER_UNAVAILABLE",
            ErrorCode::BusinessRule => "BUSINESS_RULE_VIOLATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Canonical HTTP status for this code.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::Unauthorized
            | ErrorCode::TokenExpired
            | ErrorCode::InvalidToken
            | ErrorCode::InvalidCredentials
            | ErrorCode::InvalidRefreshToken => 401,
            ErrorCode::Forbidden => 403,
            ErrorCode::OrderNotFound
            | ErrorCode::OrderItemNotFound
            | ErrorCode::ProductNotFound
            | ErrorCode::TableNotFound
            | ErrorCode::UserNotFound
            | ErrorCode::NotFound => 404,
            ErrorCode::Conflict | ErrorCode::InvalidStatusTransition => 409,
            ErrorCode::ProductUnavailable
            | ErrorCode::ModifierUnavailable
            | ErrorCode::BusinessRule => 422,
            ErrorCode::DatabaseError | ErrorCode::InternalError => 500,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::ProductUnavailable).unwrap(),
            "\"PRODUCT_UNAVAILABLE\""
        );
        assert_eq!(ErrorCode::OrderNotFound.as_str(), "ORDER_NOT_FOUND");
    }

    #[test]
    fn status_mapping_matches_taxonomy() {
        assert_eq!(ErrorCode::ValidationError.http_status(), 400);
        assert_eq!(ErrorCode::TokenExpired.http_status(), 401);
        assert_eq!(ErrorCode::OrderNotFound.http_status(), 404);
        assert_eq!(ErrorCode::InvalidStatusTransition.http_status(), 409);
        assert_eq!(ErrorCode::ProductUnavailable.http_status(), 422);
        assert_eq!(ErrorCode::InternalError.http_status(), 500);
    }
}
