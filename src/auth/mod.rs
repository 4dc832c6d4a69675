//! Authentication module
//!
//! Supports: Bearer, Google service account (JWT exchange), no auth
//!
//! The `Authenticator` applies credentials to outgoing requests and caches
//! access tokens obtained from the token endpoint until shortly before
//! they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, ServiceAccountKey, DATASTORE_SCOPE, DEFAULT_TOKEN_URI};

#[cfg(test)]
mod tests;
