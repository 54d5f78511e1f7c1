//! Route definitions

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::handlers;
use crate::state::AppState;

/// Create the `/api` routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(handlers::health::healthz))
        // Accounts
        .route("/users", post(handlers::users::create_user))
        .route("/users", put(handlers::users::update_user))
        // Sessions
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/revoke", post(handlers::auth::revoke))
        // Posts
        .route("/posts", post(handlers::posts::create_post))
        .route("/posts", get(handlers::posts::list_posts))
        .route("/posts/:id", get(handlers::posts::get_post))
        .route("/posts/:id", delete(handlers::posts::delete_post))
        // Webhooks
        .route("/webhooks/payments", post(handlers::webhooks::payments))
}

/// Create the `/admin` routes
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/metrics", get(handlers::admin::metrics))
        .route("/reset", post(handlers::admin::reset))
}

/// Serve the static app under `/app`, counting every hit
pub fn fileserver_routes(state: Arc<AppState>, static_dir: &Path) -> Router<Arc<AppState>> {
    Router::new()
        .nest_service("/app", ServeDir::new(static_dir))
        .layer(axum::middleware::from_fn_with_state(state, count_hit))
}

async fn count_hit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    state.fileserver_hits.fetch_add(1, Ordering::Relaxed);
    next.run(request).await
}

/// Create Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
