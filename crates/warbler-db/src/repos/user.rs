//! User repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, DbResult, DbUser};

/// User repository for account management
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, email: &str, password_hash: &str) -> DbResult<DbUser> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, is_premium, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_email(e, email))?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, password_hash, is_premium, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, password_hash, is_premium, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replace a user's email and password hash
    pub async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> DbResult<DbUser> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, is_premium, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_email(e, email))?;

        user.ok_or_else(|| DbError::NotFound(format!("User {}", id)))
    }

    /// Flip the premium flag
    pub async fn set_premium(&self, id: Uuid, premium: bool) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_premium = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(premium)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("User {}", id)));
        }

        Ok(())
    }

    /// Delete every user (dev reset); cascades to refresh tokens and posts
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}

fn duplicate_email(e: sqlx::Error, email: &str) -> DbError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.constraint() == Some("users_email_key") {
            return DbError::Duplicate(format!("Email {} already exists", email));
        }
    }
    DbError::Query(e)
}
