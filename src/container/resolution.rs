//! # Container trait: resolving subscriber instances.
//!
//! A [`Container`] maps a [`SubscriberType`] to the instance whose methods the
//! dispatcher invokes. Resolution may be immediate or deferred; both shapes are
//! expressed by the [`Resolution`] tagged union so callers never have to guess.
//!
//! ## Ownership
//! The container, not the dispatcher, owns subscriber instances. The dispatcher
//! asks for an instance on **every** listener invocation; caching is the container's call.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{Container, Resolution, SubscriberType};
//!
//! #[derive(Default)]
//! struct Mailer;
//!
//! struct Prebuilt(Arc<Mailer>);
//!
//! impl Container for Prebuilt {
//!     fn get(&self, subscriber: &SubscriberType) -> Resolution {
//!         if subscriber.is::<Mailer>() {
//!             Resolution::ready(Arc::clone(&self.0))
//!         } else {
//!             Resolution::none()
//!         }
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::subscribers::SubscriberType;

/// Type-erased subscriber instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Result of a container lookup: available now, or after awaiting.
pub enum Resolution {
    /// Lookup finished synchronously; `None` means the container has no instance.
    Ready(Option<Instance>),
    /// Lookup finishes when the future settles.
    Pending(BoxFuture<'static, Option<Instance>>),
}

impl Resolution {
    /// Immediate resolution to `instance`.
    pub fn ready<S: Send + Sync + 'static>(instance: Arc<S>) -> Self {
        let instance: Instance = instance;
        Resolution::Ready(Some(instance))
    }

    /// Immediate resolution to "no instance".
    pub fn none() -> Self {
        Resolution::Ready(None)
    }

    /// Deferred resolution driven by `fut`.
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Option<Instance>> + Send + 'static,
    {
        Resolution::Pending(Box::pin(fut))
    }

    /// True if the lookup has to be awaited.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending(_))
    }

    /// Awaits the lookup regardless of its shape.
    pub async fn resolve(self) -> Option<Instance> {
        match self {
            Resolution::Ready(instance) => instance,
            Resolution::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Ready(Some(_)) => f.write_str("Ready(Some(..))"),
            Resolution::Ready(None) => f.write_str("Ready(None)"),
            Resolution::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Source of subscriber instances.
///
/// ### Implementation requirements
/// - Must not block; return [`Resolution::Pending`] for slow lookups.
/// - Returning `None` (now or later) makes the dispatch fail with
///   [`DispatchError::SubscriberResolution`](crate::DispatchError::SubscriberResolution).
pub trait Container: Send + Sync + 'static {
    /// Looks up the instance for `subscriber`.
    fn get(&self, subscriber: &SubscriberType) -> Resolution;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(u8);

    #[tokio::test]
    async fn test_ready_and_pending_resolve_uniformly() {
        let now = Resolution::ready(Arc::new(Probe(1)));
        assert!(!now.is_pending());
        let got = now.resolve().await.expect("ready instance");
        assert_eq!(got.downcast_ref::<Probe>().map(|p| p.0), Some(1));

        let later = Resolution::pending(async {
            let instance: Instance = Arc::new(Probe(2));
            Some(instance)
        });
        assert!(later.is_pending());
        let got = later.resolve().await.expect("pending instance");
        assert_eq!(got.downcast_ref::<Probe>().map(|p| p.0), Some(2));

        assert!(Resolution::none().resolve().await.is_none());
    }

    #[test]
    fn test_debug_hides_instances() {
        assert_eq!(format!("{:?}", Resolution::none()), "Ready(None)");
        assert_eq!(
            format!("{:?}", Resolution::ready(Arc::new(Probe(0)))),
            "Ready(Some(..))"
        );
    }
}
