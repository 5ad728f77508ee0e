//! Inactivity-based session window.
//!
//! A session has no identifier. It is the rolling window that stays open while the
//! persisted last-activity stamp is no older than [`SESSION_TIMEOUT`]. The window is
//! evaluated lazily whenever it is consulted; nothing runs in the background.

use std::sync::Arc;

use time::Duration;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::logger::Logger;
use crate::store::KeyValueStore;

/// Inactivity after which the next page load starts a new session.
pub const SESSION_TIMEOUT: Duration = Duration::minutes(30);

/// Logical state of the session window at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Last activity is within [`SESSION_TIMEOUT`] of now.
    Active,
    /// No activity recorded, or the last activity is older than the timeout.
    Expired,
}

/// Tracks the last-activity stamp and decides session boundaries.
///
/// Writes go to the injected store and are mirrored in memory. When the store cannot be
/// read the mirrored value is used, so a broken store degrades to a per-process window
/// instead of starting a new session on every call.
pub struct SessionTracker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
    key: String,
    last_seen: Mutex<Option<i64>>,
}

impl SessionTracker {
    /// Creates a tracker keeping the last-activity stamp under `key` in `store`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn Logger>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            logger,
            key: key.into(),
            last_seen: Mutex::new(None),
        }
    }

    /// Decides whether the current activity opens a new session.
    ///
    /// Returns `true` when no activity was ever recorded or the last one is older than
    /// [`SESSION_TIMEOUT`]. On both branches the stamp is refreshed to now: checking is
    /// itself activity.
    pub async fn needs_new_session(&self) -> bool {
        let now = self.clock.now_millis();
        let expired = self.evaluate(now).await == SessionState::Expired;
        self.stamp(now).await;

        if expired {
            self.logger.debug("session window expired, starting a new session");
        } else {
            self.logger.debug("continuing current session");
        }
        expired
    }

    /// Extends the current window to now without evaluating it.
    pub async fn touch(&self) {
        let now = self.clock.now_millis();
        self.stamp(now).await;
    }

    /// Reports the current state without stamping.
    pub async fn state(&self) -> SessionState {
        self.evaluate(self.clock.now_millis()).await
    }

    async fn evaluate(&self, now: i64) -> SessionState {
        // an out-of-range stamp cannot be measured against now
        match self
            .last_activity()
            .await
            .and_then(|last| now.checked_sub(last))
        {
            Some(elapsed) if elapsed <= timeout_millis() => SessionState::Active,
            _ => SessionState::Expired,
        }
    }

    async fn last_activity(&self) -> Option<i64> {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => match raw.trim().parse::<i64>() {
                Ok(last) => Some(last),
                Err(_) => {
                    self.logger
                        .debug(&format!("ignoring unparseable last-activity stamp {raw:?}"));
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                self.logger
                    .error(&format!("failed to read last activity, using in-memory stamp: {e}"));
                *self.last_seen.lock().await
            }
        }
    }

    async fn stamp(&self, now: i64) {
        *self.last_seen.lock().await = Some(now);
        if let Err(e) = self.store.set(&self.key, &now.to_string()).await {
            self.logger
                .error(&format!("failed to persist last activity: {e}"));
        }
    }
}

fn timeout_millis() -> i64 {
    SESSION_TIMEOUT.whole_milliseconds() as i64
}
