//! Post repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, DbPost, DbResult};

/// Post repository
pub struct PostRepo {
    pool: PgPool,
}

impl PostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post
    pub async fn create(&self, user_id: Uuid, body: &str) -> DbResult<DbPost> {
        let post = sqlx::query_as::<_, DbPost>(
            r#"
            INSERT INTO posts (user_id, body)
            VALUES ($1, $2)
            RETURNING id, user_id, body, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Find post by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbPost>> {
        let post = sqlx::query_as::<_, DbPost>(
            r#"
            SELECT id, user_id, body, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// All posts, oldest first
    pub async fn list_all(&self) -> DbResult<Vec<DbPost>> {
        let posts = sqlx::query_as::<_, DbPost>(
            r#"
            SELECT id, user_id, body, created_at, updated_at
            FROM posts
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// One author's posts, oldest first
    pub async fn list_by_author(&self, user_id: Uuid) -> DbResult<Vec<DbPost>> {
        let posts = sqlx::query_as::<_, DbPost>(
            r#"
            SELECT id, user_id, body, created_at, updated_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Delete a post
    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Post {}", id)));
        }

        Ok(())
    }
}
