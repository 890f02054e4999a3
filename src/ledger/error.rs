//! Ledger Error Types
//!
//! Business-rule violations (`NotFound`, `Forbidden`, `InvalidState`,
//! `InvalidArgument`) are surfaced to the caller as-is and never retried.
//! `Contention` marks an aborted unit of work that is safe to re-run.

use thiserror::Error;

use crate::money::MoneyError;

/// PostgreSQL SQLSTATE: serialization_failure
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL SQLSTATE: deadlock_detected
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";
/// PostgreSQL SQLSTATE: lock_not_available
const SQLSTATE_LOCK_NOT_AVAILABLE: &str = "55P03";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Concurrent update conflict: {0}")]
    Contention(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal ledger error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::Forbidden(_) => "FORBIDDEN",
            LedgerError::InvalidState(_) => "INVALID_STATE",
            LedgerError::InvalidArgument(_) => "INVALID_ARGUMENT",
            LedgerError::Unauthenticated => "UNAUTHENTICATED",
            LedgerError::Contention(_) => "CONTENTION",
            LedgerError::Database(_) => "DATABASE_ERROR",
            LedgerError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidState(_) | LedgerError::InvalidArgument(_) => 400,
            LedgerError::Unauthenticated => 401,
            LedgerError::Forbidden(_) => 403,
            LedgerError::NotFound(_) => 404,
            LedgerError::Contention(_) => 503,
            LedgerError::Database(_) | LedgerError::Internal(_) => 500,
        }
    }

    /// Whether re-running the whole operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Contention(_))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            match db_err.code().as_deref() {
                Some(SQLSTATE_SERIALIZATION_FAILURE)
                | Some(SQLSTATE_DEADLOCK_DETECTED)
                | Some(SQLSTATE_LOCK_NOT_AVAILABLE) => {
                    return LedgerError::Contention(db_err.message().to_string());
                }
                _ => {}
            }
            if db_err.is_check_violation() {
                return LedgerError::InvalidState(db_err.message().to_string());
            }
        }
        LedgerError::Database(e.to_string())
    }
}

impl From<MoneyError> for LedgerError {
    fn from(e: MoneyError) -> Self {
        LedgerError::InvalidArgument(e.to_string())
    }
}
