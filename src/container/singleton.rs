//! # SingletonContainer – one lazily built instance per subscriber type
//!
//! The default [`Container`]. The first lookup of a subscriber type builds it
//! with the factory recorded at declaration time (`S::default()`); later lookups
//! return the same `Arc`.
//!
//! ## Behavior
//! - Instances live as long as the container.
//! - Subscribers declared without a factory
//!   ([`external_subscriber`](crate::SubscriptionRegistry::external_subscriber))
//!   resolve to `None`; use a custom container for them.
//!
//! ## Internal scheme
//! ```text
//! get(ty):
//!   ├─ cached?          => Ready(Some(cached))
//!   ├─ ty.construct()   => insert, Ready(Some(new))
//!   └─ no factory       => Ready(None)
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::{Container, Instance, Resolution};
use crate::subscribers::{SubscriberId, SubscriberType};

/// Caches exactly one instance per subscriber type.
#[derive(Default)]
pub struct SingletonContainer {
    instances: Mutex<HashMap<SubscriberId, Instance>>,
}

impl SingletonContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instances built so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_or_build(&self, subscriber: &SubscriberType) -> Option<Instance> {
        let mut instances = self
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = instances.get(&subscriber.id()) {
            return Some(Arc::clone(existing));
        }

        let instance = subscriber.construct()?;
        tracing::trace!(subscriber = subscriber.name(), "subscriber instance created");
        instances.insert(subscriber.id(), Arc::clone(&instance));
        Some(instance)
    }
}

impl Container for SingletonContainer {
    fn get(&self, subscriber: &SubscriberType) -> Resolution {
        Resolution::Ready(self.get_or_build(subscriber))
    }
}
