//! Password hashing
//!
//! bcrypt with a fixed work factor. Each hash carries its own random salt,
//! so hashing the same password twice yields different encodings; equality
//! is only meaningful through [`PasswordService::verify`].

use crate::error::{AuthError, AuthResult};

/// bcrypt work factor
pub const BCRYPT_COST: u32 = 10;

/// bcrypt reads at most 72 bytes of input; longer passwords are rejected
/// outright rather than silently truncated
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Password service for hashing and verification
#[derive(Debug, Clone, Default)]
pub struct PasswordService;

impl PasswordService {
    pub fn new() -> Self {
        Self
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::CredentialTooLong);
        }

        bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verify a password against a stored hash
    ///
    /// Wrong password and undecodable hash both come back `false`; callers
    /// get no signal about which it was. The underlying comparison is
    /// constant-time.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new();
        let hash = service.hash("correct horse battery staple").unwrap();

        assert!(service.verify("correct horse battery staple", &hash));
        assert!(!service.verify("incorrect horse battery staple", &hash));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let service = PasswordService::new();
        let first = service.hash("hunter2").unwrap();
        let second = service.hash("hunter2").unwrap();

        assert_ne!(first, second);
        assert!(service.verify("hunter2", &first));
        assert!(service.verify("hunter2", &second));
    }

    #[test]
    fn test_hash_embeds_cost() {
        let service = PasswordService::new();
        let hash = service.hash("pw").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hash.contains("$10$"));
    }

    #[test]
    fn test_over_length_password_rejected() {
        let service = PasswordService::new();
        let long = "x".repeat(MAX_PASSWORD_BYTES + 1);

        assert!(matches!(
            service.hash(&long),
            Err(AuthError::CredentialTooLong)
        ));
    }

    #[test]
    fn test_max_length_password_accepted() {
        let service = PasswordService::new();
        let exact = "x".repeat(MAX_PASSWORD_BYTES);

        let hash = service.hash(&exact).unwrap();
        assert!(service.verify(&exact, &hash));
    }

    #[test]
    fn test_verify_corrupt_hash_is_false_not_error() {
        let service = PasswordService::new();
        assert!(!service.verify("anything", "not-a-bcrypt-hash"));
        assert!(!service.verify("anything", ""));
    }

    #[test]
    fn test_verify_over_length_password_is_false() {
        let service = PasswordService::new();
        let hash = service.hash("short").unwrap();
        let long = "x".repeat(MAX_PASSWORD_BYTES * 2);
        assert!(!service.verify(&long, &hash));
    }
}
