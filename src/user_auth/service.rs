use anyhow::Context;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use crate::account::UserRepository;
use crate::core_types::UserId;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::InvalidArgument(_) => 400,
            AuthError::InvalidCredentials | AuthError::InvalidToken => 401,
            AuthError::Duplicate(_) => 409,
            AuthError::Database(_) | AuthError::Internal(_) => 500,
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// User Registration Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    #[schema(example = "user1")]
    pub username: String,
    #[validate(email(message = "invalid email"))]
    #[schema(example = "user1@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "user1@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Auth Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

/// HS256 token issuer and verifier
///
/// Needs no database, so the gateway can authenticate requests even when
/// it runs on the in-memory ledger store.
pub struct TokenIssuer {
    secret: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issue a token whose subject is `user_id`
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .context("token expiry out of range")?;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate token")?;
        Ok(token)
    }

    /// Verify JWT token
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(|_| AuthError::InvalidToken)?;
        Ok(token_data.claims)
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

pub struct UserAuthService {
    pool: PgPool,
    tokens: Arc<TokenIssuer>,
}

impl UserAuthService {
    pub fn new(pool: PgPool, tokens: Arc<TokenIssuer>) -> Self {
        Self { pool, tokens }
    }

    /// Register a new user
    pub async fn register(&self, req: RegisterRequest) -> Result<UserId, AuthError> {
        req.validate()
            .map_err(|e| AuthError::InvalidArgument(e.to_string()))?;

        let password_hash = hash_password(&req.password)?;

        match UserRepository::create(&self.pool, &req.username, &req.email, &password_hash).await {
            Ok(user_id) => {
                tracing::info!(user_id = user_id, username = %req.username, "User registered");
                Ok(user_id)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::warn!(username = %req.username, "Registration attempt for existing user");
                Err(AuthError::Duplicate(
                    "Username or Email already exists".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = UserRepository::get_credentials_by_email(&self.pool, &req.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&req.password, &user.password_hash)?;
        if !user.can_login() {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.user_id)?;
        tracing::info!(user_id = user.user_id, "User logged in");

        Ok(AuthResponse {
            token,
            user_id: user.user_id,
            username: user.username,
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", Duration::minutes(30))
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = issuer();
        let token = tokens.issue(42).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = TokenIssuer::new("other", Duration::minutes(30))
            .issue(42)
            .unwrap();
        assert!(matches!(issuer().verify(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(issuer().verify("garbage"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        // beyond the default 60s leeway
        let tokens = TokenIssuer::new("test-secret", Duration::minutes(-5));
        let token = tokens.issue(42).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_password_hash_verify() {
        let hash = hash_password("password123").unwrap();
        assert!(verify_password("password123", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            username: "user1".into(),
            email: "user1@example.com".into(),
            password: "password123".into(),
        };
        assert!(req.validate().is_ok());

        let short = RegisterRequest {
            password: "short".into(),
            ..req
        };
        assert!(short.validate().is_err());
    }
}
