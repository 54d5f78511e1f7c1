//! Authentication configuration
//!
//! Everything here is fixed at startup and injected into the service
//! constructor; nothing is mutable at runtime.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for signing session tokens (at least 256 bits)
    pub token_secret: String,
    /// Key the billing webhook caller must present
    pub webhook_api_key: String,
    /// Refresh-token validity window from issuance
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: Duration,
    /// Revoke a refresh token on use and hand out a replacement
    pub rotate_refresh_tokens: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: "dev-only-secret-change-me-32-bytes!!".to_string(),
            webhook_api_key: "dev-only-webhook-key".to_string(),
            refresh_token_ttl: Duration::from_secs(60 * 24 * 60 * 60), // 60 days
            rotate_refresh_tokens: false,
        }
    }
}

impl AuthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.token_secret.is_empty() {
            errors.push("token secret must be set".to_string());
        } else if self.token_secret.len() < 32 {
            errors.push("token secret should be at least 256 bits (32 bytes)".to_string());
        }

        if self.webhook_api_key.is_empty() {
            errors.push("webhook API key must be set".to_string());
        }

        if self.refresh_token_ttl.as_secs() == 0 {
            errors.push("refresh token TTL must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
