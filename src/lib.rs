//! # visit-beacon
//!
//! A small client-side analytics beacon: it gives a client a durable pseudonymous identity,
//! tracks sessions by inactivity, and reports `session_start` and `page_view` events to a
//! collector without ever blocking on the network.
//!
//! ## Features
//!
//! - Visitor identity `user-<epoch-ms>-<hex>`, created once and persisted
//! - Rolling 30 minute inactivity session window, evaluated lazily
//! - Flat JSON event records with caller-supplied extra fields
//! - Fire-and-forget HTTP delivery that survives the caller going away
//! - Pluggable storage: in-memory, or any database Sea-ORM supports
//! - Storage and delivery failures are logged, never surfaced to the host
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use sea_orm::Database;
//! use visit_beacon::migration::{Migrator, MigratorTrait};
//! use visit_beacon::{Activity, Beacon, BeaconConfig, HttpTransport, PageContext, SeaOrmStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Database::connect("sqlite://beacon.db?mode=rwc").await?;
//! Migrator::up(&conn, None).await?;
//!
//! let beacon = Beacon::builder(Arc::new(SeaOrmStore::new(conn)), Arc::new(HttpTransport::new()?))
//!     .with_config(BeaconConfig::default().with_logging(true))
//!     .build();
//!
//! let page = PageContext::new("https://example.com/pricing")
//!     .with_referrer("https://search.example/")
//!     .with_title("Pricing");
//!
//! beacon.page_loaded(&page).await;
//! beacon.activity(Activity::Click).await;
//! beacon.page_hidden(&page).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Events
//!
//! ```json
//! {
//!   "user_id": "user-1700000000000-9f86d081884c7d65",
//!   "event_type": "session_start",
//!   "is_new_user": true,
//!   "is_new_session": true,
//!   "page_url": "https://example.com/pricing",
//!   "referrer": "https://search.example/",
//!   "timestamp": "2023-11-14T22:13:20.000Z",
//!   "page_title": "Pricing"
//! }
//! ```
//!
//! `is_new_session` is only present on `session_start`.

mod beacon;
pub mod clock;
mod config;
pub mod entity;
pub mod event;
mod identity;
pub mod logger;
#[cfg(feature = "migration")]
pub mod migration;
mod reporter;
mod seaorm_store;
mod session;
pub mod store;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use beacon::{Activity, Beacon, BeaconBuilder, PageSignal};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BeaconConfig, DEFAULT_ENDPOINT, DEFAULT_IDENTITY_KEY, DEFAULT_SESSION_KEY};
pub use event::{EventKind, EventRecord, PageContext};
pub use identity::{IdentityResolver, ResolvedIdentity};
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use reporter::EventReporter;
pub use seaorm_store::SeaOrmStore;
pub use session::{SessionState, SessionTracker, SESSION_TIMEOUT};
pub use store::{KeyValueStore, MemoryStore};
pub use transport::{HttpTransport, LogTransport, Transport, TransportError};
