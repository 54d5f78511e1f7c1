//! OpenAPI documentation

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// Warbler API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warbler API",
        description = "A small social-post service: accounts, sessions, and short text posts.",
        version = "0.1.0",
        license(name = "Apache-2.0")
    ),
    paths(
        handlers::health::healthz,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::revoke,
        handlers::posts::create_post,
        handlers::posts::list_posts,
        handlers::posts::get_post,
        handlers::posts::delete_post,
        handlers::webhooks::payments,
    ),
    components(schemas(
        dto::CreateUserRequest,
        dto::UpdateUserRequest,
        dto::UserResponse,
        dto::LoginRequest,
        dto::LoginResponse,
        dto::RefreshResponse,
        dto::CreatePostRequest,
        dto::PostResponse,
        dto::WebhookRequest,
        dto::WebhookData,
        dto::HealthResponse,
        ErrorResponse,
    )),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Accounts", description = "Account management"),
        (name = "Sessions", description = "Login and refresh-token lifecycle"),
        (name = "Posts", description = "Short text posts"),
        (name = "Webhooks", description = "Server-to-server billing events")
    )
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_builds() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json().unwrap();
        assert!(json.contains("/api/login"));
        assert!(json.contains("/api/posts"));
        assert!(json.contains("bearer_token"));
    }
}
