use thiserror::Error;

use crate::core_types::ItemId;

#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    InvalidArgument(String),
}

impl ItemError {
    pub fn code(&self) -> &'static str {
        match self {
            ItemError::Database(_) => "DATABASE_ERROR",
            ItemError::NotFound(_) => "NOT_FOUND",
            ItemError::Forbidden(_) => "FORBIDDEN",
            ItemError::Duplicate(_) => "DUPLICATE",
            ItemError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ItemError::InvalidArgument(_) => 400,
            ItemError::Forbidden(_) => 403,
            ItemError::NotFound(_) => 404,
            ItemError::Duplicate(_) => 409,
            ItemError::Database(_) => 500,
        }
    }
}
