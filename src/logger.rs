//! Diagnostic logging seam.
//!
//! Analytics failures must never disturb the host, so the only thing the core does with
//! them is log. The [`Logger`] trait lets a host pick where that goes: [`TracingLogger`]
//! forwards to `tracing`, [`NoopLogger`] discards everything.

/// Sink for diagnostic messages emitted by the beacon.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to the `tracing` macros under the `visit_beacon` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "visit_beacon", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "visit_beacon", "{message}");
    }
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}
