//! Gateway types module
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//!
//! ## Submodules
//! - [`response`]: Response types, error codes and error mapping

pub mod response;

// Re-export commonly used types at module root
pub use response::{
    ApiError, ApiResponse, ApiResult, api_error, created, error_codes, map_auth_error,
    map_item_error, map_ledger_error, map_validation_error, ok, service_unavailable,
};
