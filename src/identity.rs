//! Durable pseudonymous visitor identity.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::logger::Logger;
use crate::store::KeyValueStore;

/// Outcome of [`IdentityResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// The visitor identifier, `user-<epoch-ms>-<hex>`.
    pub id: String,
    /// `true` only on the call that generated the identifier.
    pub created: bool,
}

/// Obtains or creates the visitor identifier.
///
/// The identifier is written to the store once, on creation, and read back on every later
/// call. Every identifier handed out is mirrored in memory: when the store fails the
/// mirrored one is returned, so a transient failure never changes the visitor within the
/// current page life.
pub struct IdentityResolver {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
    key: String,
    known: Mutex<Option<KnownIdentity>>,
}

#[derive(Debug, Clone)]
struct KnownIdentity {
    id: String,
    /// `false` while the id only lives in memory because the store refused it.
    persisted: bool,
}

impl IdentityResolver {
    /// Creates a resolver reading and writing the identity under `key` in `store`.
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
            known: Mutex::new(None),
        }
    }

    /// Returns the stored identifier, generating and persisting one when none exists.
    ///
    /// An empty store after a previously persisted id means the host cleared its storage,
    /// and a new visitor begins. An empty store while the current id only lives in memory
    /// means the earlier write never landed; that id is written again instead.
    pub async fn resolve(&self) -> ResolvedIdentity {
        let mut known = self.known.lock().await;

        match self.store.get(&self.key).await {
            Ok(Some(id)) => {
                self.logger.debug(&format!("returning visitor {id}"));
                *known = Some(KnownIdentity {
                    id: id.clone(),
                    persisted: true,
                });
                ResolvedIdentity { id, created: false }
            }
            Ok(None) => {
                let unsaved = known
                    .as_ref()
                    .filter(|current| !current.persisted)
                    .map(|current| current.id.clone());

                match unsaved {
                    Some(id) => {
                        let persisted = self.persist(&id).await;
                        *known = Some(KnownIdentity {
                            id: id.clone(),
                            persisted,
                        });
                        ResolvedIdentity { id, created: false }
                    }
                    None => {
                        let id = generate_id(self.clock.now_millis());
                        let persisted = self.persist(&id).await;
                        self.logger.debug(&format!("new visitor {id}"));
                        *known = Some(KnownIdentity {
                            id: id.clone(),
                            persisted,
                        });
                        ResolvedIdentity { id, created: true }
                    }
                }
            }
            Err(e) => {
                self.logger
                    .error(&format!("failed to read visitor id, using in-memory id: {e}"));
                match known.as_ref() {
                    Some(current) => ResolvedIdentity {
                        id: current.id.clone(),
                        created: false,
                    },
                    None => {
                        let id = generate_id(self.clock.now_millis());
                        *known = Some(KnownIdentity {
                            id: id.clone(),
                            persisted: false,
                        });
                        ResolvedIdentity { id, created: true }
                    }
                }
            }
        }
    }

    async fn persist(&self, id: &str) -> bool {
        match self.store.set(&self.key, id).await {
            Ok(()) => true,
            Err(e) => {
                self.logger
                    .error(&format!("failed to persist visitor id, keeping it in memory: {e}"));
                false
            }
        }
    }
}

fn generate_id(now_millis: i64) -> String {
    format!("user-{}-{:016x}", now_millis, rand::random::<u64>())
}
