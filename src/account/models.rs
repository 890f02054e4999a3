//! Data models for user accounts

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::core_types::UserId;

/// User account (public projection, no credentials)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Login lookup row
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

impl UserCredentials {
    pub fn can_login(&self) -> bool {
        self.is_active
    }
}
