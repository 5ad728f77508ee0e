use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::logger::Logger;
use crate::store::{self, KeyValueStore, MemoryStore};
use crate::transport::Transport;

/// Store whose every operation fails, like storage blocked by the host.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> store::Result<Option<String>> {
        Err(store::Error::Unavailable)
    }

    async fn set(&self, _key: &str, _value: &str) -> store::Result<()> {
        Err(store::Error::Unavailable)
    }
}

/// In-memory store that fails exactly one `get` or `set` call, counted from 1.
///
/// Calls made by a test directly on the store count too.
pub struct FlakyStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
    failing_get: Option<usize>,
    failing_set: Option<usize>,
}

impl FlakyStore {
    pub fn failing_get_call(n: usize) -> Self {
        Self::new(Some(n), None)
    }

    pub fn failing_set_call(n: usize) -> Self {
        Self::new(None, Some(n))
    }

    fn new(failing_get: Option<usize>, failing_set: Option<usize>) -> Self {
        Self {
            inner: MemoryStore::new(),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            failing_get,
            failing_set,
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> store::Result<Option<String>> {
        let call = self.gets.fetch_add(1, Ordering::SeqCst) + 1;
        if Some(call) == self.failing_get {
            return Err(store::Error::Backend("transient read failure".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> store::Result<()> {
        let call = self.sets.fetch_add(1, Ordering::SeqCst) + 1;
        if Some(call) == self.failing_set {
            return Err(store::Error::Backend("transient write failure".into()));
        }
        self.inner.set(key, value).await
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    debug: Mutex<Vec<String>>,
    error: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn debugs(&self) -> Vec<String> {
        self.debug.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.error.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.debug.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.error.lock().unwrap().push(message.to_string());
    }
}

/// Transport that keeps every payload it is handed.
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, serde_json::Value)>>,
    accept: bool,
}

impl RecordingTransport {
    pub fn accepting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            accept: true,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            accept: false,
        }
    }

    pub fn sent(&self) -> Vec<(String, serde_json::Value)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.sent().into_iter().map(|(_, body)| body).collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, url: &str, body: Vec<u8>) -> bool {
        let value = serde_json::from_slice(&body).unwrap();
        self.sent.lock().unwrap().push((url.to_string(), value));
        self.accept
    }
}
