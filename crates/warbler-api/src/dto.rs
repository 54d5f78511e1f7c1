//! Request and response DTOs
//!
//! Responses carrying user data are built through [`UserResponse::from`],
//! which never includes the password hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use warbler_db::{DbPost, DbUser};

// =============================================================================
// Accounts
// =============================================================================

/// Create-account request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Email address
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Update-account request; replaces both credentials
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New email address
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// New password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// A user as the API returns it; the password hash never leaves the server
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for UserResponse {
    fn from(user: DbUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_premium: user.is_premium,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<warbler_auth::UserRecord> for UserResponse {
    fn from(user: warbler_auth::UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_premium: user.is_premium,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password
    pub password: String,
    /// Requested session-token lifetime; signed so zero and negative values
    /// deserialize fine and fall back to the default like any other value
    /// outside (0, 3600]
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

/// Login response: the user plus both credentials
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Session token (JWT)
    pub token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    /// Fresh session token
    pub token: String,
    /// Replacement refresh token, present only when rotation is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

// =============================================================================
// Posts
// =============================================================================

/// Create-post request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    /// Post body, at most 140 bytes
    pub body: String,
}

/// A post as the API returns it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbPost> for PostResponse {
    fn from(post: DbPost) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            body: post.body,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Query parameters for listing posts
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListPostsQuery {
    /// Restrict to one author
    pub author_id: Option<Uuid>,
    /// `asc` (default) or `desc` by creation time
    pub sort: Option<String>,
}

// =============================================================================
// Webhooks
// =============================================================================

/// Billing webhook payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookRequest {
    /// Event name; only `user.upgraded` mutates anything
    pub event: String,
    pub data: WebhookData,
}

/// Billing webhook event data
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookData {
    /// The user the event concerns, as a string so a malformed id is a 400
    /// rather than a deserialization failure
    pub user_id: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_omits_password_hash() {
        let user = DbUser {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            is_premium: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_login_response_flattens_user() {
        let user = UserResponse {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            is_premium: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = LoginResponse {
            user,
            token: "jwt".to_string(),
            refresh_token: "refresh".to_string(),
        };

        let json: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["token"], "jwt");
        assert_eq!(json["refresh_token"], "refresh");
    }

    #[test]
    fn test_refresh_response_hides_absent_rotation() {
        let response = RefreshResponse {
            token: "jwt".to_string(),
            refresh_token: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("refresh_token"));
    }

    #[test]
    fn test_login_request_accepts_negative_lifetime() {
        let request: LoginRequest = serde_json::from_str(
            r#"{"email": "a@b.com", "password": "pw", "expires_in_seconds": -5}"#,
        )
        .unwrap();
        assert_eq!(request.expires_in_seconds, Some(-5));

        let request: LoginRequest =
            serde_json::from_str(r#"{"email": "a@b.com", "password": "pw"}"#).unwrap();
        assert_eq!(request.expires_in_seconds, None);
    }

    #[test]
    fn test_create_user_request_validation() {
        let bad = CreateUserRequest {
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
        };
        assert!(bad.validate().is_err());

        let good = CreateUserRequest {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(good.validate().is_ok());
    }
}
