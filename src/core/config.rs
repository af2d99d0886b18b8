//! # Dispatcher configuration.
//!
//! Provides [`DispatcherConfig`], the settings a [`Dispatcher`](crate::Dispatcher)
//! is built with.
//!
//! ## Sentinel values
//! - `max_ancestor_depth = 0` → treated as `1` (only the concrete event type is considered)

/// Settings for one dispatcher.
///
/// ## Field semantics
/// - `max_ancestor_depth`: how many event types (concrete type included) the parent walk visits
/// - `respect_propagation`: whether [`Event::is_propagation_stopped`](crate::Event::is_propagation_stopped)
///   ends a dispatch early
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over reading fields directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Upper bound on the ancestor walk.
    ///
    /// Chains longer than this are truncated (a warning is logged) instead of
    /// looping forever on a malformed `parent()` implementation.
    pub max_ancestor_depth: usize,

    /// Honor the event's propagation flag.
    ///
    /// When `true`, a stopped event skips the remaining serial listeners and the
    /// whole background phase.
    pub respect_propagation: bool,
}

impl DispatcherConfig {
    /// Ancestor walk bound, clamped to a minimum of 1.
    #[inline]
    pub fn ancestor_depth(&self) -> usize {
        self.max_ancestor_depth.max(1)
    }

    /// Returns a copy with `max_ancestor_depth` replaced.
    #[must_use]
    pub fn with_max_ancestor_depth(mut self, depth: usize) -> Self {
        self.max_ancestor_depth = depth;
        self
    }

    /// Returns a copy that ignores the propagation flag.
    #[must_use]
    pub fn ignoring_propagation(mut self) -> Self {
        self.respect_propagation = false;
        self
    }
}

impl Default for DispatcherConfig {
    /// Default configuration:
    ///
    /// - `max_ancestor_depth = 64`
    /// - `respect_propagation = true`
    fn default() -> Self {
        Self {
            max_ancestor_depth: 64,
            respect_propagation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let cfg = DispatcherConfig::default();
        assert_eq!(cfg.ancestor_depth(), 64);
        assert!(cfg.respect_propagation);

        let cfg = cfg.with_max_ancestor_depth(0).ignoring_propagation();
        assert_eq!(cfg.ancestor_depth(), 1);
        assert!(!cfg.respect_propagation);
    }
}
