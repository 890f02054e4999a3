use axum::{Json, extract::State};
use std::sync::Arc;

use super::service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::core_types::UserId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, created, map_auth_error, ok, service_unavailable};

/// Register a new user
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<i64>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already exists"),
        (status = 503, description = "Auth service unavailable")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<UserId> {
    let user_auth = state
        .user_auth
        .as_ref()
        .ok_or_else(|| service_unavailable("Auth service"))?;

    let user_id = user_auth.register(req).await.map_err(map_auth_error)?;
    created(user_id)
}

/// Login user
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Auth service unavailable")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let user_auth = state
        .user_auth
        .as_ref()
        .ok_or_else(|| service_unavailable("Auth service"))?;

    let resp = user_auth.login(req).await.map_err(|e| {
        tracing::warn!(error = %e, "Login failed");
        map_auth_error(e)
    })?;
    ok(resp)
}
