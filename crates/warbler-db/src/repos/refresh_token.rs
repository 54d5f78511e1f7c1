//! Refresh token repository
//!
//! Rows are keyed by the opaque 64-hex token string a client presents.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbRefreshToken, DbResult};

/// Refresh token repository
pub struct RefreshTokenRepo {
    pool: PgPool,
}

impl RefreshTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly issued token
    pub async fn create(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> DbResult<DbRefreshToken> {
        let row = sqlx::query_as::<_, DbRefreshToken>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, expires_at, revoked_at, created_at, updated_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Look up a token
    pub async fn find_by_token(&self, token: &str) -> DbResult<Option<DbRefreshToken>> {
        let row = sqlx::query_as::<_, DbRefreshToken>(
            r#"
            SELECT token, user_id, expires_at, revoked_at, created_at, updated_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Stamp a token revoked; succeeds whether or not a matching row exists
    pub async fn revoke(&self, token: &str) -> DbResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW(), updated_at = NOW() WHERE token = $1",
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Revoke every live token a user holds (password change)
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW(), updated_at = NOW()
            WHERE user_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Drop rows past their expiry; returns how many were removed
    pub async fn delete_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
