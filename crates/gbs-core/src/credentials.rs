//! Credential lookup capability
//!
//! Fetches that need authentication ask a [`CredentialProvider`] for a
//! user/password pair stored under a named item. The provider is pluggable so
//! platforms without a credential store get a no-op.

use std::fmt;

/// A user/password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of stored credentials
pub trait CredentialProvider: Send + Sync {
    /// Look up the item named `item`. Empty names never match.
    fn retrieve(&self, item: &str) -> Option<Credentials>;
}

/// Credential provider that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn retrieve(&self, _item: &str) -> Option<Credentials> {
        None
    }
}

/// Fixed credentials for one item name
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    item: String,
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(item: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            item: item.into(),
            credentials,
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn retrieve(&self, item: &str) -> Option<Credentials> {
        if !item.is_empty() && item == self.item {
            Some(self.credentials.clone())
        } else {
            None
        }
    }
}
