//! Account handlers

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::AppState;

/// Create an account
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Accounts",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid email or over-long password", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let password_hash = state.auth.password.hash(&request.password)?;

    let user = state
        .db
        .user_repo()
        .create(&request.email, &password_hash)
        .await
        .map_err(|e| match e {
            warbler_db::DbError::Duplicate(_) => {
                ApiError::Conflict("Email already registered".to_string())
            }
            other => ApiError::from(other),
        })?;

    tracing::info!(user_id = %user.id, "account created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Replace the caller's email and password
///
/// A successful credential change revokes every outstanding refresh token
/// the user holds; existing session tokens ride out their short lifetime.
#[utoipa::path(
    put,
    path = "/api/users",
    tag = "Accounts",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let password_hash = state.auth.password.hash(&request.password)?;

    let user = state
        .db
        .user_repo()
        .update_credentials(user_id, &request.email, &password_hash)
        .await
        .map_err(|e| match e {
            warbler_db::DbError::Duplicate(_) => {
                ApiError::Conflict("Email already registered".to_string())
            }
            other => ApiError::from(other),
        })?;

    state.auth.revoke_user_sessions(user_id).await?;

    Ok(Json(user.into()))
}
