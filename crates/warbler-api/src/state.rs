//! Application state shared across handlers

use std::str::FromStr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use warbler_auth::AuthService;
use warbler_db::Database;

/// Deployment flavor; destructive admin endpoints exist only on `Dev`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Dev,
    Prod,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(format!("unknown platform {:?} (expected dev or prod)", other)),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Database connections
    pub db: Arc<Database>,
    /// Authentication service
    pub auth: Arc<AuthService>,
    /// Deployment platform
    pub platform: Platform,
    /// Requests served through the static fileserver since startup/reset
    pub fileserver_hits: AtomicU64,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: Arc<Database>, auth: Arc<AuthService>, platform: Platform) -> Self {
        Self {
            db,
            auth,
            platform,
            fileserver_hits: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("dev".parse::<Platform>().unwrap(), Platform::Dev);
        assert_eq!("prod".parse::<Platform>().unwrap(), Platform::Prod);
        assert!("staging".parse::<Platform>().is_err());
    }
}
