//! Key-value storage used to persist the visitor identity and the last-activity stamp.
//!
//! Both the [`IdentityResolver`](crate::IdentityResolver) and the
//! [`SessionTracker`](crate::SessionTracker) receive a store through this trait, so a host
//! can back them with browser-like local storage, a database through
//! [`SeaOrmStore`](crate::SeaOrmStore), or the in-process [`MemoryStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Errors a [`KeyValueStore`] backend can report.
///
/// Callers in this crate never propagate these to the host: they log them and fall
/// back to in-memory state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend failed while executing the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The backend cannot be reached at all.
    #[error("storage unavailable")]
    Unavailable,
}

/// Convenience alias for store results.
pub type Result<T> = std::result::Result<T, Error>;

/// Durable string-to-string storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// A process-local store.
///
/// Values live as long as the store itself. Useful for tests and for hosts that
/// only need identity and sessions for a single process lifetime.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns `true` when nothing has been written yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Removes every key, as if the host cleared its storage.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
