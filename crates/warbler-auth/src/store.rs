//! Persistence seams the auth core depends on
//!
//! The core only ever sees these traits; the production implementations
//! adapt the `warbler-db` repositories and map storage failures to
//! [`AuthError::Storage`]. Tests swap in in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AuthResult;
use crate::refresh::RefreshTokenRecord;

/// A user row as the auth core needs to see it
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<warbler_db::DbUser> for UserRecord {
    fn from(u: warbler_db::DbUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            password_hash: u.password_hash,
            is_premium: u.is_premium,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// User lookups the core performs during login and refresh
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>>;
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<UserRecord>>;
}

/// Durable refresh-token records
///
/// `revoke` is idempotent: revoking an already-revoked or nonexistent token
/// succeeds, and the core does not distinguish "no rows affected".
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()>;
    async fn find_by_token(&self, token: &str) -> AuthResult<Option<RefreshTokenRecord>>;
    async fn revoke(&self, token: &str) -> AuthResult<()>;
    async fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<u64>;
}

/// [`UserStore`] backed by the PostgreSQL user repository
pub struct DbUserStore {
    repo: warbler_db::UserRepo,
}

impl DbUserStore {
    pub fn new(repo: warbler_db::UserRepo) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserStore for DbUserStore {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>> {
        Ok(self.repo.find_by_email(email).await?.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<UserRecord>> {
        Ok(self.repo.find_by_id(id).await?.map(UserRecord::from))
    }
}

/// [`RefreshTokenStore`] backed by the PostgreSQL refresh-token repository
pub struct DbRefreshTokenStore {
    repo: warbler_db::RefreshTokenRepo,
}

impl DbRefreshTokenStore {
    pub fn new(repo: warbler_db::RefreshTokenRepo) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl RefreshTokenStore for DbRefreshTokenStore {
    async fn create(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()> {
        self.repo.create(token, user_id, expires_at).await?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<RefreshTokenRecord>> {
        let row = self.repo.find_by_token(token).await?;
        Ok(row.map(|r| RefreshTokenRecord {
            token: r.token,
            user_id: r.user_id,
            expires_at: r.expires_at,
            revoked_at: r.revoked_at,
        }))
    }

    async fn revoke(&self, token: &str) -> AuthResult<()> {
        self.repo.revoke(token).await?;
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<u64> {
        Ok(self.repo.revoke_all_for_user(user_id).await?)
    }
}
