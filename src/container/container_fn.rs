//! # Function-backed container (`ContainerFn`)
//!
//! [`ContainerFn`] wraps a closure `F: Fn(&SubscriberType) -> Resolution` so simple
//! containers do not need a dedicated type.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{Container, ContainerFn, Resolution, SubscriberType};
//!
//! #[derive(Default)]
//! struct Audit;
//!
//! let container: Arc<dyn Container> = ContainerFn::arc(|ty: &SubscriberType| {
//!     if ty.is::<Audit>() {
//!         Resolution::ready(Arc::new(Audit))
//!     } else {
//!         Resolution::none()
//!     }
//! });
//! # let _ = container;
//! ```

use std::sync::Arc;

use super::{Container, Resolution};
use crate::subscribers::SubscriberType;

/// Function-backed container implementation.
#[derive(Debug)]
pub struct ContainerFn<F> {
    f: F,
}

impl<F> ContainerFn<F> {
    /// Creates a new function-backed container.
    ///
    /// Prefer [`ContainerFn::arc`] when you immediately hand it to a dispatcher.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the container and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> Container for ContainerFn<F>
where
    F: Fn(&SubscriberType) -> Resolution + Send + Sync + 'static,
{
    fn get(&self, subscriber: &SubscriberType) -> Resolution {
        (self.f)(subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Target;

    #[tokio::test]
    async fn test_closure_is_called_per_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let container = ContainerFn::new(move |_ty: &SubscriberType| {
            seen.fetch_add(1, Ordering::SeqCst);
            Resolution::ready(Arc::new(Target))
        });

        let ty = SubscriberType::of::<Target>();
        assert!(container.get(&ty).resolve().await.is_some());
        assert!(container.get(&ty).resolve().await.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
