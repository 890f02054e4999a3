//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Standard error code constants
//! - `ApiError` and the `From` conversions from every module error

use axum::{Json, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::inventory::ItemError;
use crate::ledger::LedgerError;
use crate::user_auth::AuthError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Handler error type
// ============================================================================

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Result type of every JSON handler
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 OK with `data`
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 Created with `data`
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

pub fn api_error(status: StatusCode, code: i32, msg: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::<()>::error(code, msg)))
}

/// 503 for routes whose backing service is not configured
pub fn service_unavailable(what: &str) -> ApiError {
    api_error(
        StatusCode::SERVICE_UNAVAILABLE,
        error_codes::SERVICE_UNAVAILABLE,
        format!("{} unavailable", what),
    )
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Map a ledger error to an HTTP response
///
/// Storage details are logged and replaced by a generic message.
pub fn map_ledger_error(e: LedgerError) -> ApiError {
    let code = match &e {
        LedgerError::NotFound(_) => error_codes::NOT_FOUND,
        LedgerError::Forbidden(_) => error_codes::FORBIDDEN,
        LedgerError::InvalidState(_) => error_codes::INVALID_STATE,
        LedgerError::InvalidArgument(_) => error_codes::INVALID_PARAMETER,
        LedgerError::Unauthenticated => error_codes::AUTH_FAILED,
        LedgerError::Contention(_) => error_codes::CONTENTION,
        LedgerError::Database(_) | LedgerError::Internal(_) => error_codes::INTERNAL_ERROR,
    };
    let msg = match &e {
        LedgerError::Database(_) | LedgerError::Internal(_) => {
            tracing::error!(error = %e, "Ledger operation failed");
            "Internal server error".to_string()
        }
        LedgerError::Contention(_) => {
            tracing::warn!(error = %e, "Ledger contention persisted after retries");
            "Resource busy, please retry".to_string()
        }
        _ => e.to_string(),
    };
    api_error(status_from(e.http_status()), code, msg)
}

/// Map an item store error to an HTTP response
pub fn map_item_error(e: ItemError) -> ApiError {
    let code = match &e {
        ItemError::NotFound(_) => error_codes::NOT_FOUND,
        ItemError::Forbidden(_) => error_codes::FORBIDDEN,
        ItemError::Duplicate(_) => error_codes::DUPLICATE,
        ItemError::InvalidArgument(_) => error_codes::INVALID_PARAMETER,
        ItemError::Database(_) => error_codes::INTERNAL_ERROR,
    };
    let msg = match &e {
        ItemError::Database(_) => {
            tracing::error!(error = %e, "Item store operation failed");
            "Internal server error".to_string()
        }
        _ => e.to_string(),
    };
    api_error(status_from(e.http_status()), code, msg)
}

/// Map an identity error to an HTTP response
pub fn map_auth_error(e: AuthError) -> ApiError {
    let code = match &e {
        AuthError::InvalidCredentials | AuthError::InvalidToken => error_codes::AUTH_FAILED,
        AuthError::Duplicate(_) => error_codes::DUPLICATE,
        AuthError::InvalidArgument(_) => error_codes::INVALID_PARAMETER,
        AuthError::Database(_) | AuthError::Internal(_) => error_codes::INTERNAL_ERROR,
    };
    let msg = match &e {
        AuthError::Database(_) | AuthError::Internal(_) => {
            tracing::error!(error = %e, "Auth operation failed");
            "Internal server error".to_string()
        }
        _ => e.to_string(),
    };
    api_error(status_from(e.http_status()), code, msg)
}

/// Map request shape violations to 400
pub fn map_validation_error(e: ValidationErrors) -> ApiError {
    api_error(
        StatusCode::BAD_REQUEST,
        error_codes::INVALID_PARAMETER,
        e.to_string(),
    )
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INVALID_STATE: i32 = 1002;
    pub const DUPLICATE: i32 = 1003;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const FORBIDDEN: i32 = 2003;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4001;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const CONTENTION: i32 = 5002;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_has_no_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error(1001, "bad")).unwrap();
        assert_eq!(json["code"], 1001);
        assert_eq!(json["msg"], "bad");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_ledger_error_mapping() {
        let (status, Json(body)) =
            map_ledger_error(LedgerError::Forbidden("You are not the buyer of this transaction".into()));
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code, error_codes::FORBIDDEN);
        assert_eq!(body.msg, "You are not the buyer of this transaction");

        let (status, _) = map_ledger_error(LedgerError::InvalidState("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = map_ledger_error(LedgerError::NotFound("x".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let (status, Json(body)) =
            map_ledger_error(LedgerError::Database("relation \"transactions\" does not exist".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.msg, "Internal server error");
    }

    #[test]
    fn test_item_duplicate_is_conflict() {
        let (status, Json(body)) =
            map_item_error(ItemError::Duplicate("Item already exist in this user".into()));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, error_codes::DUPLICATE);
    }
}
