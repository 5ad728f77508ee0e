//! Beacon settings and their defaults.

/// Collector endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/v1/track";

/// Storage key holding the visitor identity.
pub const DEFAULT_IDENTITY_KEY: &str = "my_site_user_id";

/// Storage key holding the last-activity stamp.
pub const DEFAULT_SESSION_KEY: &str = "my_site_last_activity";

/// Settings for a [`Beacon`](crate::Beacon).
///
/// The session timeout is not configurable: it is the fixed
/// [`SESSION_TIMEOUT`](crate::SESSION_TIMEOUT).
///
/// ```
/// use visit_beacon::BeaconConfig;
///
/// let config = BeaconConfig::default()
///     .with_endpoint("https://stats.example.com/api/v1/track")
///     .with_logging(true);
/// assert_eq!(config.identity_key, "my_site_user_id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconConfig {
    /// Where events are POSTed.
    pub endpoint: String,
    /// Storage key of the visitor identity.
    pub identity_key: String,
    /// Storage key of the last-activity stamp.
    pub session_key: String,
    /// Emit diagnostics through `tracing`. Off means a no-op logger.
    pub logging: bool,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            logging: false,
        }
    }
}

impl BeaconConfig {
    /// Sets the collector URL events are POSTed to.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides both storage keys, e.g. to run two beacons on one store.
    pub fn with_keys(
        mut self,
        identity_key: impl Into<String>,
        session_key: impl Into<String>,
    ) -> Self {
        self.identity_key = identity_key.into();
        self.session_key = session_key.into();
        self
    }

    /// Turns `tracing` diagnostics on or off.
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }
}
