//! # Logger trait and failure context.
//!
//! Provides [`Logger`], the sink for listener failures the dispatcher isolates.
//!
//! Every isolated failure is reported exactly once, together with a
//! [`ListenerFailure`] describing where it happened:
//! ```text
//! Listener::invoke ──► handler Err / panic ──► Logger::error(message, &ListenerFailure)
//! background task  ──► DispatchError       ──► Logger::error(message, &ListenerFailure)
//! ```
//!
//! ## Rules
//! - Implementations must not panic; a panicking logger is not isolated.
//! - Calls come from whatever task ran the listener (caller task or background task).
//!
//! ## Example
//! ```rust
//! use eventvisor::{ListenerFailure, Logger};
//!
//! struct Stderr;
//!
//! impl Logger for Stderr {
//!     fn error(&self, message: &str, failure: &ListenerFailure) {
//!         eprintln!("{message}: {}::{} ({})", failure.subscriber, failure.method, failure.error);
//!     }
//! }
//! ```

use std::fmt;

use crate::error::{DispatchError, HandlerError};

/// Which dispatch phase a listener ran in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Awaited before `dispatch` returns.
    Serial,
    /// Spawned after the serial phase.
    Background,
}

impl Phase {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Phase::Serial => "serial",
            Phase::Background => "background",
        }
    }
}

/// What went wrong inside a listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureCause {
    /// The handler returned an error or panicked.
    Handler(HandlerError),
    /// The listener could not be wired to an instance.
    Dispatch(DispatchError),
}

impl FailureCause {
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureCause::Handler(e) => e.as_label(),
            FailureCause::Dispatch(e) => e.as_label(),
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Handler(e) => write!(f, "{}", e.as_message()),
            FailureCause::Dispatch(e) => write!(f, "{}", e.as_message()),
        }
    }
}

impl From<HandlerError> for FailureCause {
    fn from(e: HandlerError) -> Self {
        FailureCause::Handler(e)
    }
}

impl From<DispatchError> for FailureCause {
    fn from(e: DispatchError) -> Self {
        FailureCause::Dispatch(e)
    }
}

/// Context of one isolated listener failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Subscriber type name.
    pub subscriber: &'static str,
    /// Handler method name.
    pub method: &'static str,
    /// Concrete type name of the dispatched event.
    pub event: &'static str,
    /// Event type the listener was declared on (the dispatched type or an ancestor).
    pub declared_on: &'static str,
    pub phase: Phase,
    pub error: FailureCause,
}

/// Sink for isolated listener failures.
pub trait Logger: Send + Sync + 'static {
    /// Reports one failure. Must not panic.
    fn error(&self, message: &str, failure: &ListenerFailure);
}
