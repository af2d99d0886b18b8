//! # Asynchronous containers.
//!
//! [`AsyncContainer`] is the ergonomic way to write a container whose lookups
//! need to await (connection pools, lazily loaded config, remote factories).
//! [`AsyncResolver`] adapts it to [`Container`]; every lookup becomes a
//! [`Resolution::Pending`] that the listener awaits before invoking the handler.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use eventvisor::{AsyncContainer, Instance, SubscriberType};
//!
//! #[derive(Default)]
//! struct Billing;
//!
//! struct Lazy;
//!
//! #[async_trait]
//! impl AsyncContainer for Lazy {
//!     async fn resolve(&self, ty: &SubscriberType) -> Option<Instance> {
//!         // e.g. await a database handle here
//!         ty.construct()
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use super::{Container, Instance, Resolution};
use crate::subscribers::SubscriberType;

/// Container whose lookups are asynchronous.
#[async_trait]
pub trait AsyncContainer: Send + Sync + 'static {
    /// Resolves the instance for `subscriber`; `None` if unavailable.
    async fn resolve(&self, subscriber: &SubscriberType) -> Option<Instance>;
}

/// Adapter exposing an [`AsyncContainer`] as a [`Container`].
pub struct AsyncResolver<C> {
    inner: Arc<C>,
}

impl<C: AsyncContainer> AsyncResolver<C> {
    /// Wraps `inner`.
    pub fn new(inner: C) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Wraps an already shared container.
    pub fn from_arc(inner: Arc<C>) -> Self {
        Self { inner }
    }
}

impl<C: AsyncContainer> Container for AsyncResolver<C> {
    fn get(&self, subscriber: &SubscriberType) -> Resolution {
        let inner = Arc::clone(&self.inner);
        let subscriber = *subscriber;
        Resolution::pending(async move { inner.resolve(&subscriber).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Target;

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AsyncContainer for Counting {
        async fn resolve(&self, subscriber: &SubscriberType) -> Option<Instance> {
            tokio::task::yield_now().await;
            self.calls.fetch_add(1, Ordering::SeqCst);
            subscriber.construct()
        }
    }

    #[tokio::test]
    async fn test_lookups_are_pending_and_awaited() {
        let inner = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let resolver = AsyncResolver::from_arc(Arc::clone(&inner));
        let ty = SubscriberType::of::<Target>();

        let resolution = resolver.get(&ty);
        assert!(resolution.is_pending());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);

        let instance = resolution.resolve().await.expect("instance");
        assert!(instance.downcast_ref::<Target>().is_some());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
