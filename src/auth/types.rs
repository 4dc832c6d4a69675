//! Auth configuration types

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth2 scope granting document database access
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Token endpoint used when the key file does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Service-account key material
///
/// Only the fields needed for the JWT exchange are read; the rest of the
/// key file is ignored.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse the key from its JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(text)
            .map_err(|e| Error::auth(format!("Invalid service account credentials: {e}")))?;
        if key.client_email.trim().is_empty() {
            return Err(Error::auth("Service account credentials have no client_email"));
        }
        if key.private_key.trim().is_empty() {
            return Err(Error::auth("Service account credentials have no private_key"));
        }
        Ok(key)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication (emulators)
    #[default]
    None,

    /// Pre-issued bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// Service account: signed JWT exchanged for an access token
    ServiceAccount {
        /// Key material
        key: ServiceAccountKey,
        /// Requested scope
        scope: String,
        /// Token lifetime in seconds
        token_lifetime_seconds: u64,
    },
}

impl AuthConfig {
    /// Service-account auth with the datastore scope and one-hour tokens
    pub fn service_account(key: ServiceAccountKey) -> Self {
        AuthConfig::ServiceAccount {
            key,
            scope: DATASTORE_SCOPE.to_string(),
            token_lifetime_seconds: 3600,
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_not_expired() {
        let token = CachedToken::expires_in("test".to_string(), 3600);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_cached_token_inside_buffer_is_expired() {
        let token = CachedToken::expires_in("test".to_string(), 10);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_no_expiration() {
        let token = CachedToken::new("test".to_string(), None);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_service_account_key_defaults() {
        let key = ServiceAccountKey::from_json(
            r#"{"type":"service_account","client_email":"sa@p.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(key.project_id.is_none());
    }

    #[test]
    fn test_service_account_key_rejects_missing_fields() {
        assert!(ServiceAccountKey::from_json("{}").is_err());
        assert!(ServiceAccountKey::from_json("not json").is_err());
        assert!(ServiceAccountKey::from_json(
            r#"{"client_email":"","private_key":"pem"}"#
        )
        .is_err());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"sa@p","private_key":"SECRET-PEM"}"#,
        )
        .unwrap();
        assert!(!format!("{key:?}").contains("SECRET-PEM"));
    }

    #[test]
    fn test_auth_config_default() {
        assert!(matches!(AuthConfig::default(), AuthConfig::None));
    }
}
