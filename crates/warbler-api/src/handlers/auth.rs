//! Session handlers: login, refresh, revoke
//!
//! Refresh and revoke both take the refresh token as a bearer credential in
//! the `Authorization` header; neither has a request body.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use std::time::Duration;

use crate::dto::{LoginRequest, LoginResponse, RefreshResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Sessions",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Incorrect email or password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let requested_lifetime = request
        .expires_in_seconds
        .filter(|secs| *secs > 0)
        .map(|secs| Duration::from_secs(secs as u64));

    let outcome = state
        .auth
        .login(&request.email, &request.password, requested_lifetime)
        .await?;

    Ok(Json(LoginResponse {
        user: outcome.user.into(),
        token: outcome.session_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// Exchange a refresh token for a new session token
#[utoipa::path(
    post,
    path = "/api/refresh",
    tag = "Sessions",
    responses(
        (status = 200, description = "New session token issued", body = RefreshResponse),
        (status = 401, description = "Unknown, revoked, or expired refresh token", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RefreshResponse>> {
    let refresh_token =
        warbler_auth::extract::bearer_token(&headers).map_err(|_| ApiError::Unauthorized)?;

    let outcome = state.auth.refresh_session(&refresh_token).await?;

    Ok(Json(RefreshResponse {
        token: outcome.session_token,
        refresh_token: outcome.rotated_refresh_token,
    }))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/revoke",
    tag = "Sessions",
    responses(
        (status = 204, description = "Token revoked (or never existed)"),
        (status = 401, description = "No refresh token presented", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let refresh_token =
        warbler_auth::extract::bearer_token(&headers).map_err(|_| ApiError::Unauthorized)?;

    state.auth.revoke_session(&refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
