//! Bearer token shared by all upstream requests.

use std::sync::Arc;

use tokio::sync::RwLock;

/// Holds the bearer token attached to upstream requests.
///
/// Cloning is cheap; clones share the same slot, so a sign-in through
/// one handle is seen by every synchronizer.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    /// Creates a store seeded with an optional token.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(token.filter(|t| !t.trim().is_empty()))),
        }
    }

    /// Returns the current token.
    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    /// Replaces the token. Blank tokens clear the slot.
    pub async fn set(&self, token: impl Into<String>) {
        let token = token.into();
        *self.inner.write().await = Some(token).filter(|t| !t.trim().is_empty());
    }

    /// Removes the token.
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}
