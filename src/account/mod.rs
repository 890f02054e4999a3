//! Account management module
//!
//! PostgreSQL-based storage for users.

pub mod models;
pub mod repository;

// Re-export commonly used types
pub use models::{User, UserCredentials};
pub use repository::UserRepository;

// Re-export Database from top-level db module
pub use crate::db::Database;
