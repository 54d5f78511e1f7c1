//! Billing webhook handler
//!
//! A server-to-server caller, authenticated by the configured API key
//! rather than a session token. Same header, different trust boundary.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::WebhookRequest;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Event name that flips a user to premium
const EVENT_USER_UPGRADED: &str = "user.upgraded";

/// Handle a billing event
#[utoipa::path(
    post,
    path = "/api/webhooks/payments",
    tag = "Webhooks",
    request_body = WebhookRequest,
    responses(
        (status = 204, description = "Event processed (or ignored)"),
        (status = 400, description = "Malformed user id", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or wrong API key", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown user", body = crate::error::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn payments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<WebhookRequest>,
) -> ApiResult<StatusCode> {
    if !state.auth.check_api_key(&headers) {
        return Err(ApiError::Unauthorized);
    }

    if request.event != EVENT_USER_UPGRADED {
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = Uuid::parse_str(&request.data.user_id)
        .map_err(|_| ApiError::BadRequest("Malformed user id".to_string()))?;

    state
        .db
        .user_repo()
        .set_premium(user_id, true)
        .await
        .map_err(|e| match e {
            warbler_db::DbError::NotFound(_) => ApiError::NotFound("User".to_string()),
            other => ApiError::from(other),
        })?;

    tracing::info!(%user_id, "user upgraded to premium");

    Ok(StatusCode::NO_CONTENT)
}
