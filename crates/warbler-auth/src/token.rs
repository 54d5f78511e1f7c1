//! Session token issuance and validation
//!
//! Session tokens are standard HS256 JWTs carrying `{iss, sub, iat, exp}`,
//! interoperable with any JWT implementation sharing the secret. The
//! expected algorithm is pinned on the validation side; the token header is
//! never consulted for it.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Issuer claim stamped into every session token
pub const TOKEN_ISSUER: &str = "warbler";

/// Default and maximum session-token lifetime
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Why a token failed validation; internal diagnostics only, collapsed to
/// `Unauthorized` at the service boundary
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not decodable as a signed token of the expected shape
    #[error("malformed token")]
    Malformed,
    /// Signature mismatch; tampering or a different secret
    #[error("bad signature")]
    BadSignature,
    /// Signature fine, expiry in the past
    #[error("token expired")]
    Expired,
    /// `sub` claim is not a user id
    #[error("unparsable subject claim")]
    UnparsableSubject,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and validates session tokens against the shared server secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a new token service over a shared secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token asserting `user_id` was authenticated now
    ///
    /// `lifetime` falls back to [`MAX_TOKEN_LIFETIME`] when absent and is
    /// clamped to it when longer; asking for more than the maximum behaves
    /// exactly like asking for nothing.
    pub fn issue(&self, user_id: Uuid, lifetime: Option<Duration>) -> AuthResult<String> {
        let lifetime = lifetime.unwrap_or(MAX_TOKEN_LIFETIME).min(MAX_TOKEN_LIFETIME);
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode session token: {}", e)))
    }

    /// Validate a token and return the subject user id
    ///
    /// A token passes iff its signature verifies against our secret and its
    /// expiry is still in the future; there is no leeway.
    pub fn validate(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_issuer(&[TOKEN_ISSUER]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::UnparsableSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-session-tokens-32b!";

    fn decode_claims(token: &str) -> Claims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn test_issue_then_validate_roundtrip() {
        let service = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, None).unwrap();
        assert_eq!(service.validate(&token).unwrap(), user_id);
    }

    #[test]
    fn test_claims_shape() {
        let service = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();

        let claims = decode_claims(&service.issue(user_id, None).unwrap());
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_default_lifetime_equals_explicit_maximum() {
        let service = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();

        let implicit = decode_claims(&service.issue(user_id, None).unwrap());
        let explicit = decode_claims(
            &service
                .issue(user_id, Some(Duration::from_secs(3600)))
                .unwrap(),
        );

        assert_eq!(implicit.exp - implicit.iat, explicit.exp - explicit.iat);
    }

    #[test]
    fn test_shorter_lifetime_honored() {
        let service = TokenService::new(SECRET);
        let claims = decode_claims(
            &service
                .issue(Uuid::new_v4(), Some(Duration::from_secs(600)))
                .unwrap(),
        );
        assert_eq!(claims.exp - claims.iat, 600);
    }

    #[test]
    fn test_oversized_lifetime_clamped() {
        let service = TokenService::new(SECRET);
        let claims = decode_claims(
            &service
                .issue(Uuid::new_v4(), Some(Duration::from_secs(86400)))
                .unwrap(),
        );
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let service = TokenService::new(SECRET);
        assert_eq!(service.validate(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new(SECRET);
        let verifier = TokenService::new("a-completely-different-secret-32-bytes!");

        let token = issuer.issue(Uuid::new_v4(), None).unwrap();
        assert_eq!(
            verifier.validate(&token).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_garbage_rejected_as_malformed() {
        let service = TokenService::new(SECRET);

        for garbage in ["", "not-a-token", "a.b.c", "ey.ey.ey"] {
            assert_eq!(
                service.validate(garbage).unwrap_err(),
                TokenError::Malformed,
                "input: {:?}",
                garbage
            );
        }
    }

    #[test]
    fn test_unparsable_subject_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: "not-a-user-id".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let service = TokenService::new(SECRET);
        assert_eq!(
            service.validate(&token).unwrap_err(),
            TokenError::UnparsableSubject
        );
    }

    #[test]
    fn test_foreign_algorithm_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let service = TokenService::new(SECRET);
        assert!(service.validate(&token).is_err());
    }
}
