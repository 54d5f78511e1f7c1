//! Post handlers and body cleaning

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::{CreatePostRequest, ListPostsQuery, PostResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

/// Longest accepted post body, in bytes
pub const MAX_POST_BYTES: usize = 140;

/// Words masked out of post bodies before they are stored
const BANNED_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];

/// Mask banned words in a post body
///
/// Matching is case-insensitive and on whole whitespace-delimited words
/// only, so punctuation stuck to a word defeats the match. Splitting and
/// rejoining collapses interior whitespace runs to single spaces.
pub fn clean_body(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            if BANNED_WORDS.contains(&word.to_lowercase().as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Create a post
#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "Posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Post is too long", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    if request.body.len() > MAX_POST_BYTES {
        return Err(ApiError::BadRequest("Post is too long".to_string()));
    }

    let body = clean_body(&request.body);
    let post = state.db.post_repo().create(user_id, &body).await?;

    tracing::info!(post_id = %post.id, user_id = %user_id, "post created");

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// List posts, optionally by author, ascending by default
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "Posts",
    params(
        ("author_id" = Option<Uuid>, Query, description = "Restrict to one author"),
        ("sort" = Option<String>, Query, description = "asc (default) or desc by creation time")
    ),
    responses(
        (status = 200, description = "Posts", body = [PostResponse])
    )
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let repo = state.db.post_repo();
    let mut posts = match query.author_id {
        Some(author_id) => repo.list_by_author(author_id).await?,
        None => repo.list_all().await?,
    };

    if query.sort.as_deref() == Some("desc") {
        posts.reverse();
    }

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// Fetch one post
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "No such post", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostResponse>> {
    let post = state
        .db
        .post_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    Ok(Json(post.into()))
}

/// Delete a post; only its author may
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not the author", body = crate::error::ErrorResponse),
        (status = 404, description = "No such post", body = crate::error::ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let repo = state.db.post_repo();
    let post = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    if post.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
