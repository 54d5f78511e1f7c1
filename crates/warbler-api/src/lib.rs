//! Warbler REST API
//!
//! The HTTP surface over the auth core and storage layer.
//!
//! # API Structure
//!
//! ```text
//! /api/
//! ├── /healthz            - Liveness
//! ├── /users              - Account create/update
//! ├── /login              - Password login
//! ├── /refresh, /revoke   - Refresh-token lifecycle
//! ├── /posts              - Short text posts
//! └── /webhooks/payments  - Billing events (API-key authenticated)
//! /admin/
//! ├── /metrics            - Fileserver hit count
//! └── /reset              - Dev-only counter + database reset
//! /app/*                  - Static files (hit-counted)
//! ```

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult};
pub use state::{AppState, Platform};

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
    /// Enable request compression
    pub enable_compression: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Serve Swagger UI at /docs
    pub enable_swagger: bool,
    /// Directory served under /app
    pub static_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            enable_compression: true,
            enable_tracing: true,
            max_body_size: 1024 * 1024, // 1MB
            enable_swagger: true,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Create the main router with all middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let mut router = Router::new()
        .nest("/api", routes::api_routes())
        .nest("/admin", routes::admin_routes())
        .merge(routes::fileserver_routes(state.clone(), &config.static_dir));

    if config.enable_swagger {
        router = router.merge(routes::swagger_routes());
    }

    let mut router = router.with_state(state);

    let x_request_id = HeaderName::from_static("x-request-id");
    router = router
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .layer(DefaultBodyLimit::max(config.max_body_size));

    if config.enable_tracing {
        router = router.layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        );
    }

    if config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    if config.enable_cors {
        let cors = if config.cors_origins.contains(&"*".to_string()) {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.enable_cors);
        assert!(config.enable_compression);
        assert_eq!(config.max_body_size, 1024 * 1024);
    }
}
