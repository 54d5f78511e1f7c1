//! Admin handlers: fileserver metrics and the dev-only reset

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, Platform};

/// Fileserver hit count, as a small HTML page
pub async fn metrics(State(state): State<Arc<AppState>>) -> Html<String> {
    let hits = state.fileserver_hits.load(Ordering::Relaxed);

    Html(format!(
        "<html>\n<body>\n<h1>Welcome, Warbler Admin</h1>\n<p>Warbler has been visited {} times!</p>\n</body>\n</html>\n",
        hits
    ))
}

/// Zero the hit counter and delete every user; dev platform only
pub async fn reset(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    if state.platform != Platform::Dev {
        return Err(ApiError::Forbidden);
    }

    state.fileserver_hits.store(0, Ordering::Relaxed);
    let deleted = state.db.user_repo().delete_all().await?;

    tracing::warn!(deleted, "dev reset: all users deleted, hit counter zeroed");

    Ok((StatusCode::OK, "Hits reset to 0 and database reset to initial state."))
}
