//! Event assembly and hand-off to the transport.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clock::Clock;
use crate::event::{EventKind, EventRecord, PageContext};
use crate::identity::IdentityResolver;
use crate::logger::Logger;
use crate::transport::Transport;

/// Builds event records and hands them to the transport.
///
/// Delivery is at most once and best effort. [`track`](Self::track) returns nothing and
/// never fails: a serialization error or a transport that declines the attempt is logged
/// and the event is dropped.
pub struct EventReporter {
    identity: IdentityResolver,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
    endpoint: String,
}

impl EventReporter {
    /// Creates a reporter sending every event to `endpoint`.
    pub fn new(
        identity: IdentityResolver,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn Logger>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            transport,
            clock,
            logger,
            endpoint: endpoint.into(),
        }
    }

    /// Resolves the visitor, builds the record and hands it to the transport.
    ///
    /// `EventKind::SessionStart { new_session }` must carry the verdict of
    /// [`SessionTracker::needs_new_session`](crate::SessionTracker::needs_new_session).
    pub async fn track(&self, kind: EventKind, page: &PageContext, extra: Map<String, Value>) {
        let visitor = self.identity.resolve().await;
        let (record, dropped) = EventRecord::new(
            visitor.id,
            visitor.created,
            kind,
            page,
            self.clock.now_millis(),
            extra,
        );
        if !dropped.is_empty() {
            self.logger
                .debug(&format!("ignored reserved extra fields: {}", dropped.join(", ")));
        }

        let body = match serde_json::to_vec(&record) {
            Ok(body) => body,
            Err(e) => {
                self.logger
                    .error(&format!("failed to encode {} event: {e}", kind.as_str()));
                return;
            }
        };

        if self.transport.send(&self.endpoint, body) {
            self.logger.debug(&format!(
                "sent {} for {} (new user: {})",
                kind.as_str(),
                record.user_id,
                record.is_new_user
            ));
        } else {
            self.logger.error(&format!(
                "transport did not attempt delivery of {} to {}",
                kind.as_str(),
                self.endpoint
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::logger::NoopLogger;
    use crate::store::MemoryStore;
    use crate::test_support::{RecordingLogger, RecordingTransport};
    use serde_json::json;

    const ENDPOINT: &str = "http://127.0.0.1:5000/api/v1/track";

    fn reporter(transport: Arc<RecordingTransport>, logger: Arc<RecordingLogger>) -> EventReporter {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let identity = IdentityResolver::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            Arc::new(NoopLogger),
            "my_site_user_id",
        );
        EventReporter::new(identity, transport, clock, logger, ENDPOINT)
    }

    #[tokio::test]
    async fn track_sends_flat_json_to_endpoint() {
        let transport = Arc::new(RecordingTransport::accepting());
        let reporter = reporter(transport.clone(), Arc::new(RecordingLogger::default()));
        let page = PageContext::new("https://example.com/").with_title("Home");

        let mut extra = Map::new();
        extra.insert("page_title".into(), json!("Home"));
        reporter
            .track(EventKind::SessionStart { new_session: true }, &page, extra)
            .await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        let (url, body) = &sent[0];
        assert_eq!(url, ENDPOINT);
        assert_eq!(body["event_type"], "session_start");
        assert_eq!(body["is_new_user"], true);
        assert_eq!(body["is_new_session"], true);
        assert_eq!(body["page_url"], "https://example.com/");
        assert_eq!(body["referrer"], "direct");
        assert_eq!(body["page_title"], "Home");
        assert_eq!(body["timestamp"], "2023-11-14T22:13:20.000Z");
    }

    #[tokio::test]
    async fn identity_flag_and_session_flag_are_independent() {
        let transport = Arc::new(RecordingTransport::accepting());
        let reporter = reporter(transport.clone(), Arc::new(RecordingLogger::default()));
        let page = PageContext::new("https://example.com/");

        reporter.track(EventKind::PageView, &page, Map::new()).await;
        reporter
            .track(EventKind::SessionStart { new_session: true }, &page, Map::new())
            .await;

        let bodies = transport.bodies();
        assert_eq!(bodies[0]["is_new_user"], true);
        assert!(bodies[0].get("is_new_session").is_none());
        assert_eq!(bodies[1]["is_new_user"], false);
        assert_eq!(bodies[1]["is_new_session"], true);
        assert_eq!(bodies[0]["user_id"], bodies[1]["user_id"]);
    }

    #[tokio::test]
    async fn declined_delivery_is_logged_not_retried() {
        let transport = Arc::new(RecordingTransport::rejecting());
        let logger = Arc::new(RecordingLogger::default());
        let reporter = reporter(transport.clone(), logger.clone());

        reporter
            .track(EventKind::PageView, &PageContext::new("https://example.com/"), Map::new())
            .await;

        assert_eq!(transport.sent().len(), 1);
        assert_eq!(logger.errors().len(), 1);
    }
}
