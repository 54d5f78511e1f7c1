//! Refresh-token generation and lifecycle
//!
//! A refresh token is 32 bytes of cryptographically secure randomness,
//! hex-encoded: a 64-character opaque handle with no embedded structure.
//! All of its state lives in the store row it keys; this module decides how
//! that row reads at a given instant.
//!
//! Revocation policy: a token counts as revoked once `revoked_at` is in the
//! past, i.e. revocation takes effect *at* `revoked_at`. Every write path
//! stamps the current instant, so in practice revocation is immediate.

use chrono::{DateTime, Utc};
use rand::RngCore;
use uuid::Uuid;

/// Bytes of entropy in a refresh token (64 hex characters on the wire)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new opaque refresh token
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A refresh-token row as the store returns it
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// How a record reads at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenStatus {
    /// Usable for a refresh
    Active,
    /// `revoked_at` has passed
    Revoked,
    /// `expires_at` has passed
    Expired,
}

impl RefreshTokenRecord {
    /// Evaluate the record at `now`
    ///
    /// Expiry wins over revocation when both apply; the two are terminal
    /// and indistinguishable to callers anyway.
    pub fn status(&self, now: DateTime<Utc>) -> RefreshTokenStatus {
        if self.expires_at <= now {
            return RefreshTokenStatus::Expired;
        }
        match self.revoked_at {
            Some(revoked_at) if revoked_at < now => RefreshTokenStatus::Revoked,
            _ => RefreshTokenStatus::Active,
        }
    }

    /// True when the record still admits a refresh at `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == RefreshTokenStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_in: i64, revoked_at: Option<DateTime<Utc>>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            token: generate_refresh_token(),
            user_id: Uuid::new_v4(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
            revoked_at,
        }
    }

    #[test]
    fn test_token_is_64_lowercase_hex() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, token.to_lowercase());
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_refresh_token(), generate_refresh_token());
    }

    #[test]
    fn test_fresh_record_is_active() {
        let record = record(3600, None);
        assert_eq!(record.status(Utc::now()), RefreshTokenStatus::Active);
        assert!(record.is_active(Utc::now()));
    }

    #[test]
    fn test_past_revocation_is_revoked() {
        let record = record(3600, Some(Utc::now() - Duration::seconds(10)));
        assert_eq!(record.status(Utc::now()), RefreshTokenStatus::Revoked);
    }

    #[test]
    fn test_future_revocation_not_yet_effective() {
        // Revocation takes effect at revoked_at, not before.
        let record = record(3600, Some(Utc::now() + Duration::seconds(300)));
        assert_eq!(record.status(Utc::now()), RefreshTokenStatus::Active);
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let record = record(-10, None);
        assert_eq!(record.status(Utc::now()), RefreshTokenStatus::Expired);
    }

    #[test]
    fn test_expiry_wins_over_revocation() {
        let record = record(-10, Some(Utc::now() - Duration::seconds(60)));
        assert_eq!(record.status(Utc::now()), RefreshTokenStatus::Expired);
    }
}
