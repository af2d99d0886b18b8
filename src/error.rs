//! Error types used by the dispatcher and by subscriber handlers.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`]: wiring errors raised by the dispatcher itself
//!   (unknown subscriber, container misconfiguration, missing runtime). They fail the
//!   call that triggered them.
//! - [`HandlerError`]: failures raised by individual subscriber handlers. They never
//!   leave the listener that produced them; the dispatcher reports them to the
//!   [`Logger`](crate::Logger) and moves on.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::fmt;

use thiserror::Error;

/// # Errors produced by the dispatcher.
///
/// These represent configuration or wiring failures, not subscriber business errors.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A subscriber type was used (dispatcher construction or lookup) without ever being declared.
    #[error("\"{subscriber}\" is not a declared event subscriber")]
    UnknownSubscriber {
        /// Type name of the undeclared subscriber.
        subscriber: &'static str,
    },

    /// The container produced no instance for a subscriber type.
    #[error("container returned no instance for subscriber \"{subscriber}\"")]
    SubscriberResolution {
        /// Type name of the subscriber that could not be resolved.
        subscriber: &'static str,
    },

    /// The container produced an instance of a different concrete type.
    #[error("container returned a mismatched instance for subscriber \"{subscriber}\"")]
    SubscriberMismatch {
        /// Type name of the subscriber that was requested.
        subscriber: &'static str,
    },

    /// An event with background listeners was dispatched outside a tokio runtime.
    #[error("event \"{event}\" has background listeners but no tokio runtime is running")]
    NoRuntime {
        /// Type name of the dispatched event.
        event: &'static str,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::DispatchError;
    ///
    /// let err = DispatchError::UnknownSubscriber { subscriber: "Mailer" };
    /// assert_eq!(err.as_label(), "unknown_subscriber");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::UnknownSubscriber { .. } => "unknown_subscriber",
            DispatchError::SubscriberResolution { .. } => "subscriber_resolution",
            DispatchError::SubscriberMismatch { .. } => "subscriber_mismatch",
            DispatchError::NoRuntime { .. } => "no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::UnknownSubscriber { subscriber } => {
                format!("unknown subscriber: {subscriber}")
            }
            DispatchError::SubscriberResolution { subscriber } => {
                format!("unresolved subscriber: {subscriber}")
            }
            DispatchError::SubscriberMismatch { subscriber } => {
                format!("mismatched subscriber instance: {subscriber}")
            }
            DispatchError::NoRuntime { event } => format!("no tokio runtime for: {event}"),
        }
    }

    /// Name of the subscriber type the error refers to, if any.
    pub fn subscriber(&self) -> Option<&'static str> {
        match self {
            DispatchError::UnknownSubscriber { subscriber }
            | DispatchError::SubscriberResolution { subscriber }
            | DispatchError::SubscriberMismatch { subscriber } => Some(subscriber),
            DispatchError::NoRuntime { .. } => None,
        }
    }
}

/// # Errors produced by subscriber handlers.
///
/// Returned from handler functions (or synthesized from a caught panic).
/// They are always isolated to the listener that raised them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked while processing the event.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Wraps any displayable error as [`HandlerError::Fail`].
    ///
    /// # Example
    /// ```
    /// use eventvisor::HandlerError;
    ///
    /// let err = HandlerError::fail("smtp unavailable");
    /// assert_eq!(err.to_string(), "handler failed: smtp unavailable");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        HandlerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Builds a [`HandlerError::Panicked`] from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        HandlerError::Panicked { info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_labels_are_stable() {
        let unknown = DispatchError::UnknownSubscriber { subscriber: "A" };
        let unresolved = DispatchError::SubscriberResolution { subscriber: "B" };
        let mismatch = DispatchError::SubscriberMismatch { subscriber: "C" };

        assert_eq!(unknown.as_label(), "unknown_subscriber");
        assert_eq!(unresolved.as_label(), "subscriber_resolution");
        assert_eq!(mismatch.as_label(), "subscriber_mismatch");
        assert_eq!(mismatch.subscriber(), Some("C"));

        let no_runtime = DispatchError::NoRuntime { event: "Tick" };
        assert_eq!(no_runtime.as_label(), "no_runtime");
        assert_eq!(no_runtime.subscriber(), None);
    }

    #[test]
    fn test_unknown_subscriber_names_type() {
        let err = DispatchError::UnknownSubscriber { subscriber: "InvalidSubscriber" };
        assert!(err.to_string().contains("InvalidSubscriber"));
        assert_eq!(err.as_message(), "unknown subscriber: InvalidSubscriber");
    }

    #[test]
    fn test_panic_payload_rendering() {
        let static_payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let owned_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        let opaque_payload: Box<dyn std::any::Any + Send> = Box::new(42_u8);

        assert_eq!(
            HandlerError::from_panic(static_payload.as_ref()),
            HandlerError::Panicked { info: "boom".into() }
        );
        assert_eq!(
            HandlerError::from_panic(owned_payload.as_ref()),
            HandlerError::Panicked { info: "bang".into() }
        );
        assert_eq!(
            HandlerError::from_panic(opaque_payload.as_ref()).as_message(),
            "panic: unknown panic"
        );
    }
}
