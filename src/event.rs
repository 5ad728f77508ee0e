//! The flat event record sent to the collector.

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys owned by the record itself. Extra fields may not shadow them.
pub const RESERVED_KEYS: [&str; 7] = [
    "user_id",
    "event_type",
    "is_new_user",
    "is_new_session",
    "page_url",
    "referrer",
    "timestamp",
];

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A session started. `new_session` is the session tracker's verdict.
    SessionStart { new_session: bool },
    PageView,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SessionStart { .. } => "session_start",
            EventKind::PageView => "page_view",
        }
    }
}

/// Where it happened, as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// Full URL of the page.
    pub url: String,
    /// Referring URL; `None` or empty is reported as `"direct"`.
    pub referrer: Option<String>,
    /// Document title, reported as `page_title`.
    pub title: String,
}

impl PageContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// One report, serialized as a single flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub user_id: String,
    pub event_type: &'static str,
    pub is_new_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new_session: Option<bool>,
    pub page_url: String,
    pub referrer: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventRecord {
    /// Builds a record. Returns it together with the extra keys that were dropped because
    /// they collide with [`RESERVED_KEYS`].
    pub fn new(
        user_id: String,
        is_new_user: bool,
        kind: EventKind,
        page: &PageContext,
        timestamp_millis: i64,
        extra: Map<String, Value>,
    ) -> (Self, Vec<String>) {
        let mut dropped = Vec::new();
        let extra = extra
            .into_iter()
            .filter(|(key, _)| {
                let reserved = RESERVED_KEYS.contains(&key.as_str());
                if reserved {
                    dropped.push(key.clone());
                }
                !reserved
            })
            .collect();

        let is_new_session = match kind {
            EventKind::SessionStart { new_session } => Some(new_session),
            EventKind::PageView => None,
        };

        let referrer = match page.referrer.as_deref() {
            Some(referrer) if !referrer.is_empty() => referrer.to_string(),
            _ => "direct".to_string(),
        };

        let record = Self {
            user_id,
            event_type: kind.as_str(),
            is_new_user,
            is_new_session,
            page_url: page.url.clone(),
            referrer,
            timestamp: iso_timestamp(timestamp_millis),
            extra,
        };
        (record, dropped)
    }
}

/// Renders epoch milliseconds as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn iso_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
