//! Host-facing wiring of identity, session tracking and reporting.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::clock::{Clock, SystemClock};
use crate::config::BeaconConfig;
use crate::event::{EventKind, PageContext};
use crate::identity::IdentityResolver;
use crate::logger::{Logger, NoopLogger, TracingLogger};
use crate::reporter::EventReporter;
use crate::session::{SessionState, SessionTracker};
use crate::store::KeyValueStore;
use crate::transport::Transport;

/// Lightweight user activity that only extends the session window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Click,
    Scroll,
    PointerMove,
}

/// Signals a host forwards from its page lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSignal {
    /// The page finished loading.
    Loaded(PageContext),
    Activity(Activity),
    /// The page became hidden or is being unloaded.
    Hidden(PageContext),
}

/// The analytics beacon of one page host.
///
/// ```
/// use std::sync::Arc;
/// use visit_beacon::{Beacon, LogTransport, MemoryStore, PageContext};
///
/// # async fn example() {
/// let beacon = Beacon::builder(Arc::new(MemoryStore::new()), Arc::new(LogTransport::default()))
///     .build();
///
/// beacon
///     .page_loaded(&PageContext::new("https://example.com/").with_title("Home"))
///     .await;
/// # }
/// ```
pub struct Beacon {
    sessions: SessionTracker,
    reporter: EventReporter,
    logger: Arc<dyn Logger>,
}

impl Beacon {
    /// Starts a builder with the default config, the system clock and a config-driven logger.
    pub fn builder(store: Arc<dyn KeyValueStore>, transport: Arc<dyn Transport>) -> BeaconBuilder {
        BeaconBuilder {
            store,
            transport,
            config: BeaconConfig::default(),
            clock: Arc::new(SystemClock),
            logger: None,
        }
    }

    /// Dispatches a host signal to the matching handler.
    pub async fn handle(&self, signal: PageSignal) {
        match signal {
            PageSignal::Loaded(page) => self.page_loaded(&page).await,
            PageSignal::Activity(activity) => self.activity(activity).await,
            PageSignal::Hidden(page) => self.page_hidden(&page).await,
        }
    }

    /// Emits `session_start` when the window had expired, `page_view` otherwise.
    pub async fn page_loaded(&self, page: &PageContext) {
        let kind = if self.sessions.needs_new_session().await {
            EventKind::SessionStart { new_session: true }
        } else {
            EventKind::PageView
        };
        self.reporter.track(kind, page, title_extra(page)).await;
    }

    /// Extends the session window. Never emits an event.
    pub async fn activity(&self, activity: Activity) {
        self.logger.debug(&format!("activity {activity:?}"));
        self.sessions.touch().await;
    }

    /// Refreshes the session and emits a final `page_view` with `action = "page_hidden"`.
    pub async fn page_hidden(&self, page: &PageContext) {
        self.sessions.touch().await;
        let mut extra = title_extra(page);
        extra.insert("action".to_string(), json!("page_hidden"));
        self.reporter.track(EventKind::PageView, page, extra).await;
    }

    /// Sends a `page_view` with caller-supplied extra fields, e.g. `action`.
    ///
    /// `session_start` is not accepted here: only [`page_loaded`](Self::page_loaded) emits
    /// it, with the session tracker's verdict.
    pub async fn track_page_view(&self, page: &PageContext, extra: Map<String, Value>) {
        self.reporter.track(EventKind::PageView, page, extra).await;
    }

    /// Current state of the session window. Does not count as activity.
    pub async fn session_state(&self) -> SessionState {
        self.sessions.state().await
    }
}

fn title_extra(page: &PageContext) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("page_title".to_string(), json!(page.title));
    extra
}

/// Assembles a [`Beacon`] from its collaborators.
pub struct BeaconBuilder {
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn Transport>,
    config: BeaconConfig,
    clock: Arc<dyn Clock>,
    logger: Option<Arc<dyn Logger>>,
}

impl BeaconBuilder {
    /// Replaces the default [`BeaconConfig`].
    pub fn with_config(mut self, config: BeaconConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the system clock, e.g. with a [`ManualClock`](crate::ManualClock).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Uses `logger` regardless of [`BeaconConfig::logging`].
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Wires the resolver, tracker and reporter over the shared store and clock.
    pub fn build(self) -> Beacon {
        let logger = self.logger.unwrap_or_else(|| {
            if self.config.logging {
                Arc::new(TracingLogger) as Arc<dyn Logger>
            } else {
                Arc::new(NoopLogger)
            }
        });

        let identity = IdentityResolver::new(
            self.store.clone(),
            self.clock.clone(),
            logger.clone(),
            self.config.identity_key,
        );
        let sessions = SessionTracker::new(
            self.store,
            self.clock.clone(),
            logger.clone(),
            self.config.session_key,
        );
        let reporter = EventReporter::new(
            identity,
            self.transport,
            self.clock,
            logger.clone(),
            self.config.endpoint,
        );

        Beacon {
            sessions,
            reporter,
            logger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use crate::test_support::RecordingTransport;
    use time::Duration;

    fn beacon(clock: Arc<ManualClock>, transport: Arc<RecordingTransport>) -> Beacon {
        Beacon::builder(Arc::new(MemoryStore::new()), transport)
            .with_clock(clock)
            .build()
    }

    #[tokio::test]
    async fn reload_within_window_is_a_page_view() {
        let clock = Arc::new(ManualClock::new(0));
        let transport = Arc::new(RecordingTransport::accepting());
        let beacon = beacon(clock.clone(), transport.clone());
        let page = PageContext::new("https://example.com/").with_title("Home");

        beacon.page_loaded(&page).await;
        clock.advance(Duration::minutes(5));
        beacon.page_loaded(&page).await;

        let bodies = transport.bodies();
        assert_eq!(bodies[0]["event_type"], "session_start");
        assert_eq!(bodies[1]["event_type"], "page_view");
        assert_eq!(bodies[1]["page_title"], "Home");
    }

    #[tokio::test]
    async fn handle_dispatches_every_signal() {
        let clock = Arc::new(ManualClock::new(0));
        let transport = Arc::new(RecordingTransport::accepting());
        let beacon = beacon(clock, transport.clone());
        let page = PageContext::new("https://example.com/");

        beacon.handle(PageSignal::Loaded(page.clone())).await;
        beacon.handle(PageSignal::Activity(Activity::Scroll)).await;
        beacon.handle(PageSignal::Hidden(page)).await;

        let bodies = transport.bodies();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[1]["action"], "page_hidden");
    }

    #[tokio::test]
    async fn custom_page_view_keeps_session_flags_out() {
        let clock = Arc::new(ManualClock::new(0));
        let transport = Arc::new(RecordingTransport::accepting());
        let beacon = beacon(clock, transport.clone());

        let mut extra = Map::new();
        extra.insert("action".to_string(), json!("signup_clicked"));
        extra.insert("is_new_session".to_string(), json!(true));
        beacon
            .track_page_view(&PageContext::new("https://example.com/"), extra)
            .await;

        let bodies = transport.bodies();
        assert_eq!(bodies[0]["event_type"], "page_view");
        assert_eq!(bodies[0]["action"], "signup_clicked");
        assert!(bodies[0].get("is_new_session").is_none());
    }

    #[tokio::test]
    async fn config_endpoint_is_used() {
        let transport = Arc::new(RecordingTransport::accepting());
        let beacon = Beacon::builder(Arc::new(MemoryStore::new()), transport.clone())
            .with_config(BeaconConfig::default().with_endpoint("https://stats.example.com/t"))
            .build();

        beacon
            .page_loaded(&PageContext::new("https://example.com/"))
            .await;

        assert_eq!(transport.sent()[0].0, "https://stats.example.com/t");
    }
}
