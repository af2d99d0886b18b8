//! # LogWriter: tracing-backed default logger
//!
//! Emits every isolated listener failure as one `tracing` error event with
//! structured fields, so any installed subscriber (fmt, json, OpenTelemetry)
//! picks it up.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! ERROR eventvisor: listener failed subscriber="app::Slack" method="notify" event="app::Signup" declared_on="app::Signup" phase="background" kind="handler_failed" error="error: webhook timeout"
//! ERROR eventvisor: listener panicked subscriber="app::Audit" method="record" event="app::Signup" declared_on="app::BaseEvent" phase="serial" kind="handler_panicked" error="panic: boom"
//! ```

use super::{ListenerFailure, Logger};

/// Default [`Logger`]: forwards failures to `tracing::error!`.
#[derive(Default, Clone, Copy, Debug)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Logger for LogWriter {
    fn error(&self, message: &str, failure: &ListenerFailure) {
        tracing::error!(
            target: "eventvisor",
            subscriber = failure.subscriber,
            method = failure.method,
            event = failure.event,
            declared_on = failure.declared_on,
            phase = failure.phase.as_label(),
            kind = failure.error.as_label(),
            error = %failure.error,
            "{message}"
        );
    }
}
