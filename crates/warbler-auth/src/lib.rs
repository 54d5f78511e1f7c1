//! Warbler Authentication Core
//!
//! Password hashing, HS256 session tokens, credential extraction from
//! request headers, and the refresh-token lifecycle that lets a client mint
//! new session tokens without re-submitting a password.
//!
//! # Architecture
//!
//! ```text
//! handler ──► AuthService
//!                │
//!     ┌──────────┼─────────────┬──────────────┐
//!     ▼          ▼             ▼              ▼
//! PasswordService TokenService extract::*  RefreshTokenStore
//! ```
//!
//! Every operation is a pure function of its inputs plus the injected
//! configuration and stores; the service holds no mutable state and is safe
//! to share across concurrently served requests. Failure detail finer than
//! [`AuthError`] never crosses the crate boundary.

pub mod config;
pub mod error;
pub mod extract;
pub mod password;
pub mod refresh;
pub mod store;
pub mod token;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use password::PasswordService;
pub use refresh::{generate_refresh_token, RefreshTokenRecord, RefreshTokenStatus};
pub use store::{DbRefreshTokenStore, DbUserStore, RefreshTokenStore, UserRecord, UserStore};
pub use token::TokenService;

use chrono::Utc;
use http::HeaderMap;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use warbler_db::Database;

/// A successful login: the authenticated user plus both credentials
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserRecord,
    pub session_token: String,
    pub refresh_token: String,
}

/// A successful refresh: a fresh session token, plus a replacement refresh
/// token when rotation is enabled
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub session_token: String,
    pub rotated_refresh_token: Option<String>,
}

/// Main authentication service orchestrating the core components
pub struct AuthService {
    pub password: PasswordService,
    pub tokens: TokenService,
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    config: AuthConfig,
}

impl AuthService {
    /// Create a service backed by the PostgreSQL repositories
    pub fn new(db: Arc<Database>, config: AuthConfig) -> Self {
        let users = Arc::new(DbUserStore::new(db.user_repo()));
        let refresh_tokens = Arc::new(DbRefreshTokenStore::new(db.refresh_token_repo()));
        Self::with_stores(users, refresh_tokens, config)
    }

    /// Create a service over explicit store implementations
    pub fn with_stores(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        config: AuthConfig,
    ) -> Self {
        Self {
            password: PasswordService::new(),
            tokens: TokenService::new(&config.token_secret),
            users,
            refresh_tokens,
            config,
        }
    }

    /// Get the config reference
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Authenticate with email + password, issuing both credentials
    ///
    /// Unknown email and wrong password collapse to the same
    /// [`AuthError::InvalidCredentials`]; nothing reveals which half failed.
    /// `requested_lifetime` follows the session-token clamp rule: values
    /// outside `(0, 3600]` seconds behave like no request at all.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_lifetime: Option<Duration>,
    ) -> AuthResult<LoginOutcome> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.password.verify(password, &user.password_hash) {
            tracing::debug!(email, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let lifetime = requested_lifetime.filter(|d| !d.is_zero());
        let session_token = self.tokens.issue(user.id, lifetime)?;

        let refresh_token = generate_refresh_token();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.config.refresh_token_ttl)
                .map_err(|e| AuthError::Internal(e.to_string()))?;
        self.refresh_tokens
            .create(&refresh_token, user.id, expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginOutcome {
            user,
            session_token,
            refresh_token,
        })
    }

    /// Exchange a still-active refresh token for a new session token
    ///
    /// Unknown, revoked, and expired tokens all fail with the same
    /// [`AuthError::Unauthorized`], as does a token whose owning user no
    /// longer exists. By default the presented token stays valid; with
    /// rotation enabled it is revoked and a replacement comes back.
    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<RefreshOutcome> {
        let record = self
            .refresh_tokens
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let now = Utc::now();
        if !record.is_active(now) {
            tracing::debug!(status = ?record.status(now), "refresh rejected");
            return Err(AuthError::Unauthorized);
        }

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let session_token = self.tokens.issue(user.id, None)?;

        let rotated_refresh_token = if self.config.rotate_refresh_tokens {
            let replacement = generate_refresh_token();
            let expires_at = now
                + chrono::Duration::from_std(self.config.refresh_token_ttl)
                    .map_err(|e| AuthError::Internal(e.to_string()))?;
            self.refresh_tokens
                .create(&replacement, user.id, expires_at)
                .await?;
            self.refresh_tokens.revoke(refresh_token).await?;
            Some(replacement)
        } else {
            None
        };

        Ok(RefreshOutcome {
            session_token,
            rotated_refresh_token,
        })
    }

    /// Revoke a refresh token
    ///
    /// Succeeds whether or not a matching record exists; only a storage
    /// failure surfaces.
    pub async fn revoke_session(&self, refresh_token: &str) -> AuthResult<()> {
        self.refresh_tokens.revoke(refresh_token).await
    }

    /// Revoke every live refresh token a user holds (password change)
    pub async fn revoke_user_sessions(&self, user_id: Uuid) -> AuthResult<()> {
        let revoked = self.refresh_tokens.revoke_all_for_user(user_id).await?;
        tracing::info!(%user_id, revoked, "revoked user sessions");
        Ok(())
    }

    /// Resolve the acting user from the request's bearer token
    ///
    /// Missing header, malformed header, and every token-validation failure
    /// collapse to [`AuthError::Unauthorized`]; the finer kind is logged at
    /// debug level only.
    pub fn resolve_identity(&self, headers: &HeaderMap) -> AuthResult<Uuid> {
        let token = extract::bearer_token(headers).map_err(|e| {
            tracing::debug!(reason = %e, "identity resolution failed");
            AuthError::Unauthorized
        })?;

        self.tokens.validate(&token).map_err(|e| {
            tracing::debug!(reason = %e, "identity resolution failed");
            AuthError::Unauthorized
        })
    }

    /// Check the webhook caller's API key against the configured one
    ///
    /// Never errors: a missing or malformed header simply compares false.
    /// The comparison itself is constant-time.
    pub fn check_api_key(&self, headers: &HeaderMap) -> bool {
        let Ok(presented) = extract::api_key(headers) else {
            return false;
        };

        let expected = self.config.webhook_api_key.as_bytes();
        let presented = presented.as_bytes();
        presented.len() == expected.len() && bool::from(presented.ct_eq(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration};
    use http::header::AUTHORIZATION;
    use http::HeaderValue;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeUserStore {
        users: Vec<UserRecord>,
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>> {
            Ok(self.users.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<UserRecord>> {
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }
    }

    #[derive(Default)]
    struct FakeRefreshStore {
        rows: Mutex<HashMap<String, RefreshTokenRecord>>,
    }

    #[async_trait]
    impl RefreshTokenStore for FakeRefreshStore {
        async fn create(
            &self,
            token: &str,
            user_id: Uuid,
            expires_at: DateTime<Utc>,
        ) -> AuthResult<()> {
            self.rows.lock().unwrap().insert(
                token.to_string(),
                RefreshTokenRecord {
                    token: token.to_string(),
                    user_id,
                    expires_at,
                    revoked_at: None,
                },
            );
            Ok(())
        }

        async fn find_by_token(&self, token: &str) -> AuthResult<Option<RefreshTokenRecord>> {
            Ok(self.rows.lock().unwrap().get(token).cloned())
        }

        async fn revoke(&self, token: &str) -> AuthResult<()> {
            if let Some(row) = self.rows.lock().unwrap().get_mut(token) {
                row.revoked_at = Some(Utc::now());
            }
            Ok(())
        }

        async fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<u64> {
            let mut revoked = 0;
            for row in self.rows.lock().unwrap().values_mut() {
                if row.user_id == user_id && row.revoked_at.is_none() {
                    row.revoked_at = Some(Utc::now());
                    revoked += 1;
                }
            }
            Ok(revoked)
        }
    }

    const PASSWORD: &str = "correct horse battery staple";

    fn service() -> (AuthService, Uuid) {
        service_with_config(AuthConfig::default())
    }

    fn service_with_config(config: AuthConfig) -> (AuthService, Uuid) {
        let password_hash = PasswordService::new().hash(PASSWORD).unwrap();
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let users = Arc::new(FakeUserStore {
            users: vec![UserRecord {
                id: user_id,
                email: "a@b.com".to_string(),
                password_hash,
                is_premium: false,
                created_at: now,
                updated_at: now,
            }],
        });
        let refresh = Arc::new(FakeRefreshStore::default());
        (AuthService::with_stores(users, refresh, config), user_id)
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_login_issues_both_credentials() {
        let (service, user_id) = service();

        let outcome = service.login("a@b.com", PASSWORD, None).await.unwrap();
        assert_eq!(outcome.user.id, user_id);
        assert_eq!(outcome.refresh_token.len(), 64);

        // The session token resolves back to the same user.
        let headers = bearer_headers(&outcome.session_token);
        assert_eq!(service.resolve_identity(&headers).unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_are_uniform() {
        let (service, _) = service();

        let wrong_password = service.login("a@b.com", "nope", None).await.unwrap_err();
        let unknown_email = service
            .login("nobody@b.com", PASSWORD, None)
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_refresh_yields_new_valid_session_token() {
        let (service, user_id) = service();

        let login = service.login("a@b.com", PASSWORD, None).await.unwrap();
        let refreshed = service.refresh_session(&login.refresh_token).await.unwrap();

        assert!(refreshed.rotated_refresh_token.is_none());
        let headers = bearer_headers(&refreshed.session_token);
        assert_eq!(service.resolve_identity(&headers).unwrap(), user_id);

        // Without rotation the same refresh token keeps working.
        assert!(service.refresh_session(&login.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_then_refresh_fails() {
        let (service, _) = service();

        let login = service.login("a@b.com", PASSWORD, None).await.unwrap();
        service.revoke_session(&login.refresh_token).await.unwrap();

        assert!(matches!(
            service.refresh_session(&login.refresh_token).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_revoke_unknown_token_succeeds() {
        let (service, _) = service();
        assert!(service.revoke_session("no-such-token").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_refresh_token_rejected() {
        let (service, user_id) = service();

        let store = FakeRefreshStore::default();
        store
            .create("stale", user_id, Utc::now() - ChronoDuration::seconds(1))
            .await
            .unwrap();
        let service = AuthService::with_stores(
            service.users.clone(),
            Arc::new(store),
            AuthConfig::default(),
        );

        assert!(matches!(
            service.refresh_session("stale").await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_unknown_refresh_token_rejected() {
        let (service, _) = service();
        assert!(matches!(
            service.refresh_session(&generate_refresh_token()).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_dangling_refresh_token_rejected() {
        // Token exists but its owning user does not.
        let refresh = Arc::new(FakeRefreshStore::default());
        refresh
            .create(
                "orphan",
                Uuid::new_v4(),
                Utc::now() + ChronoDuration::days(60),
            )
            .await
            .unwrap();
        let service = AuthService::with_stores(
            Arc::new(FakeUserStore { users: vec![] }),
            refresh,
            AuthConfig::default(),
        );

        assert!(matches!(
            service.refresh_session("orphan").await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_rotation_revokes_presented_token() {
        let config = AuthConfig {
            rotate_refresh_tokens: true,
            ..Default::default()
        };
        let (service, _) = service_with_config(config);

        let login = service.login("a@b.com", PASSWORD, None).await.unwrap();
        let refreshed = service.refresh_session(&login.refresh_token).await.unwrap();

        let replacement = refreshed.rotated_refresh_token.unwrap();
        assert_ne!(replacement, login.refresh_token);

        // The old token is dead; the replacement works.
        assert!(matches!(
            service.refresh_session(&login.refresh_token).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(service.refresh_session(&replacement).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_user_sessions_kills_every_device() {
        let (service, user_id) = service();

        let first = service.login("a@b.com", PASSWORD, None).await.unwrap();
        let second = service.login("a@b.com", PASSWORD, None).await.unwrap();

        service.revoke_user_sessions(user_id).await.unwrap();

        assert!(service.refresh_session(&first.refresh_token).await.is_err());
        assert!(service
            .refresh_session(&second.refresh_token)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_resolve_identity_failures_collapse_to_unauthorized() {
        let (service, _) = service();

        // No header.
        assert!(matches!(
            service.resolve_identity(&HeaderMap::new()),
            Err(AuthError::Unauthorized)
        ));
        // Garbage token.
        assert!(matches!(
            service.resolve_identity(&bearer_headers("not-a-token")),
            Err(AuthError::Unauthorized)
        ));
        // Token signed with a different secret.
        let other = TokenService::new("a-completely-different-secret-32-bytes!");
        let forged = other.issue(Uuid::new_v4(), None).unwrap();
        assert!(matches!(
            service.resolve_identity(&bearer_headers(&forged)),
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_check_api_key() {
        let (service, _) = service();
        let key = service.config().webhook_api_key.clone();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("ApiKey {}", key)).unwrap(),
        );
        assert!(service.check_api_key(&headers));

        let mut wrong = HeaderMap::new();
        wrong.insert(AUTHORIZATION, HeaderValue::from_static("ApiKey nope"));
        assert!(!service.check_api_key(&wrong));
        assert!(!service.check_api_key(&HeaderMap::new()));
    }

    #[tokio::test]
    async fn test_login_zero_lifetime_means_default() {
        let (service, _) = service();
        let outcome = service
            .login("a@b.com", PASSWORD, Some(Duration::ZERO))
            .await
            .unwrap();
        assert!(service
            .resolve_identity(&bearer_headers(&outcome.session_token))
            .is_ok());
    }
}
