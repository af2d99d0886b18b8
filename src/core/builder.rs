use std::collections::HashSet;
use std::sync::Arc;

use super::buckets::Buckets;
use super::config::DispatcherConfig;
use super::dispatcher::Dispatcher;
use super::listener::Listener;
use crate::container::{AsyncContainer, AsyncResolver, Container, SingletonContainer};
use crate::error::DispatchError;
use crate::logger::{LogWriter, Logger};
use crate::subscribers::{SubscriberId, SubscriptionRegistry};

/// Builder for a [`Dispatcher`] with optional container, logger and config.
///
/// Defaults: [`SingletonContainer`], [`LogWriter`], [`DispatcherConfig::default`].
pub struct DispatcherBuilder<'r> {
    registry: &'r SubscriptionRegistry,
    subscribers: Vec<SubscriberId>,
    container: Option<Arc<dyn Container>>,
    logger: Option<Arc<dyn Logger>>,
    config: DispatcherConfig,
}

impl<'r> DispatcherBuilder<'r> {
    /// Creates a builder reading declarations from `registry`.
    pub fn new(registry: &'r SubscriptionRegistry) -> Self {
        Self {
            registry,
            subscribers: Vec::new(),
            container: None,
            logger: None,
            config: DispatcherConfig::default(),
        }
    }

    /// Adds subscriber types, in the order their listeners should break priority ties.
    pub fn with_subscribers(mut self, subscribers: impl IntoIterator<Item = SubscriberId>) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    /// Adds one subscriber type.
    pub fn with_subscriber<S: 'static>(mut self) -> Self {
        self.subscribers.push(SubscriberId::of::<S>());
        self
    }

    /// Resolves subscriber instances through `container`.
    ///
    /// Pass a clone of an `Arc` to share one container between dispatchers.
    pub fn with_container(mut self, container: Arc<dyn Container>) -> Self {
        self.container = Some(container);
        self
    }

    /// Resolves subscriber instances through an asynchronous container.
    pub fn with_async_container<C: AsyncContainer>(self, container: C) -> Self {
        self.with_container(Arc::new(AsyncResolver::new(container)))
    }

    /// Reports isolated failures to `logger`.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Compiles one listener per declared subscription of every subscriber.
    ///
    /// Fails with [`DispatchError::UnknownSubscriber`] if a subscriber type was never
    /// declared in the registry. A subscriber listed twice is compiled once.
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        let container = self
            .container
            .unwrap_or_else(|| Arc::new(SingletonContainer::new()));
        let logger = self.logger.unwrap_or_else(|| Arc::new(LogWriter::new()));
        let depth = self.config.ancestor_depth();

        let mut buckets = Buckets::new(depth);
        let mut seen = HashSet::with_capacity(self.subscribers.len());

        for id in self.subscribers {
            if !seen.insert(id) {
                tracing::debug!(subscriber = id.name(), "subscriber listed twice, skipped");
                continue;
            }
            let meta = self.registry.metadata_for(id)?;
            for entry in meta.subscriptions {
                let event = entry.event();
                let listener = Listener::new(
                    entry,
                    meta.subscriber,
                    Arc::clone(&container),
                    Arc::clone(&logger),
                    depth,
                );
                buckets.push(event, Arc::new(listener));
            }
        }

        tracing::debug!(
            subscribers = seen.len(),
            listeners = buckets.total(),
            "dispatcher built"
        );
        Ok(Dispatcher::from_parts(buckets, self.config, seen.len()))
    }
}
