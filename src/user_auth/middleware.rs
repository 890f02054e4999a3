use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::core_types::UserId;
use crate::gateway::{
    state::AppState,
    types::{ApiResponse, error_codes},
};

/// Authenticated caller, inserted as a request extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
}

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::MISSING_AUTH,
                "Missing Authorization header",
            )),
        ))?;

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::AUTH_FAILED,
                "Invalid token format",
            )),
        ));
    };

    // 2. Verify token and resolve the subject
    let caller = state
        .tokens
        .verify(token)
        .and_then(|claims| claims.user_id())
        .map(|user_id| Caller { user_id })
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error(
                    error_codes::AUTH_FAILED,
                    "Invalid or expired token",
                )),
            )
        })?;

    // 3. Inject caller
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
