//! # Propagation flag for events that can be stopped mid-dispatch.
//!
//! Embed a [`Propagation`] in an event and forward
//! [`Event::is_propagation_stopped`](crate::Event::is_propagation_stopped) to it.
//! A listener that calls [`Propagation::stop`] prevents the remaining serial
//! listeners and the background phase of the current dispatch from running.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Event, Propagation};
//!
//! #[derive(Default)]
//! struct OrderPlaced {
//!     propagation: Propagation,
//! }
//!
//! impl Event for OrderPlaced {
//!     fn is_propagation_stopped(&self) -> bool {
//!         self.propagation.is_stopped()
//!     }
//! }
//!
//! let ev = OrderPlaced::default();
//! ev.propagation.stop();
//! assert!(ev.is_propagation_stopped());
//! ```

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// Interior-mutable "propagation stopped" flag.
///
/// Listeners only get shared references to events, hence the atomic.
#[derive(Debug, Default)]
pub struct Propagation {
    stopped: AtomicBool,
}

impl Propagation {
    /// Creates a flag in the "propagating" state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops propagation. Idempotent.
    #[inline]
    pub fn stop(&self) {
        self.stopped.store(true, AtomicOrdering::Release);
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(AtomicOrdering::Acquire)
    }
}

impl Clone for Propagation {
    fn clone(&self) -> Self {
        Self {
            stopped: AtomicBool::new(self.is_stopped()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_sticky_and_cloned() {
        let p = Propagation::new();
        assert!(!p.is_stopped());

        p.stop();
        p.stop();
        assert!(p.is_stopped());
        assert!(p.clone().is_stopped());
    }
}
