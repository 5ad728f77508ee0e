//! Fire-and-forget delivery of serialized events.
//!
//! A [`Transport`] is handed the endpoint and the encoded body and must return without
//! waiting for the network. The returned flag only says whether a delivery attempt was
//! started; nothing about its outcome ever reaches the caller.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tokio::runtime::Handle;

use crate::logger::{Logger, TracingLogger};

/// Best-effort, non-blocking send primitive.
pub trait Transport: Send + Sync {
    /// Starts delivering `body` to `url`. Returns `true` if the attempt was started.
    fn send(&self, url: &str, body: Vec<u8>) -> bool;
}

/// Errors from building an [`HttpTransport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no tokio runtime available to spawn deliveries on")]
    NoRuntime,

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// POSTs each event as `application/json` on a spawned tokio task.
///
/// The request outlives the call that started it, so hosts tearing down can still emit a
/// final event. Responses are only logged.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    runtime: Handle,
    logger: Arc<dyn Logger>,
}

impl HttpTransport {
    /// Builds a transport that spawns onto the runtime of the calling context.
    pub fn new() -> Result<Self, TransportError> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        Self::with_handle(runtime)
    }

    /// Builds a transport that spawns onto `runtime`.
    pub fn with_handle(runtime: Handle) -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            runtime,
            logger: Arc::new(TracingLogger),
        })
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }
}

impl Transport for HttpTransport {
    fn send(&self, url: &str, body: Vec<u8>) -> bool {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                self.logger.error(&format!("invalid collector url {url:?}: {e}"));
                return false;
            }
        };

        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let logger = self.logger.clone();

        self.runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    logger.debug(&format!("delivered event to {url}: {}", response.status()));
                }
                Ok(response) => {
                    logger.error(&format!("collector {url} rejected event: {}", response.status()));
                }
                Err(e) => {
                    logger.error(&format!("failed to deliver event to {url}: {e}"));
                }
            }
        });
        true
    }
}

/// Logs the pretty-printed payload instead of sending it.
///
/// For wiring up a page before a collector exists.
#[derive(Clone)]
pub struct LogTransport {
    logger: Arc<dyn Logger>,
}

impl LogTransport {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Default for LogTransport {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger))
    }
}

impl Transport for LogTransport {
    fn send(&self, url: &str, body: Vec<u8>) -> bool {
        let rendered = serde_json::from_slice::<serde_json::Value>(&body)
            .and_then(|value| serde_json::to_string_pretty(&value))
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        self.logger
            .debug(&format!("simulated send to {url}:\n{rendered}"));
        true
    }
}
