//! # Subscription registry - which subscriber methods handle which events.
//!
//! [`SubscriptionRegistry`] is the metadata store every dispatcher is built from.
//! It keeps two indexes over the same [`Subscription`] entries:
//!
//! ```text
//! by subscriber:  SubscriberId ─► { SubscriberType, [Subscription, ...] }   (declaration order)
//! by event:       EventType    ─► [Subscription, ...]                       (insertion order)
//! ```
//!
//! ## Lifecycle
//! - **Declaration phase**: subscribers and subscriptions are added (explicit calls or
//!   [`SubscriberDeclaration`](crate::SubscriberDeclaration)s collected by [`global`](SubscriptionRegistry::global)).
//! - **Read phase**: dispatchers snapshot what they need at construction; later additions are invisible to them.
//! - Entries are never removed, except by [`reset`](SubscriptionRegistry::reset), which exists for test isolation.
//!
//! ## Rules
//! - `(subscriber, method, event)` is the identity key; re-adding it is a no-op.
//! - Reading a subscriber that was never created fails with
//!   [`DispatchError::UnknownSubscriber`].
//!
//! ## Example
//! ```rust
//! use eventvisor::{Event, Handler, HandlerResult, On, SubscriberId, SubscriptionRegistry};
//!
//! struct Shipped;
//! impl Event for Shipped {}
//!
//! #[derive(Default)]
//! struct Notifier;
//!
//! impl Notifier {
//!     fn on_shipped(&self, _ev: &Shipped) -> HandlerResult {
//!         Ok(())
//!     }
//! }
//!
//! let registry = SubscriptionRegistry::new();
//! registry
//!     .subscriber::<Notifier>()
//!     .on_sync::<Shipped>("on_shipped", On::new(), Notifier::on_shipped);
//!
//! let entries = registry.subscriptions_for(SubscriberId::of::<Notifier>()).unwrap();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].method(), "on_shipped");
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;

use super::subscription::{
    AnyHandler, AsyncHandler, Handler, On, SubscriberId, SubscriberType, Subscription, SyncHandler,
};
use crate::error::DispatchError;
use crate::events::{Event, EventType};

static GLOBAL: Lazy<SubscriptionRegistry> = Lazy::new(|| {
    let registry = SubscriptionRegistry::new();
    #[cfg(feature = "auto-declare")]
    {
        let declared = super::declare::declare_all(&registry);
        tracing::debug!(declared, "global subscription registry initialized");
    }
    registry
});

/// Metadata record of one subscriber type.
struct SubscriberRecord {
    ty: SubscriberType,
    subscriptions: Vec<Arc<Subscription>>,
}

#[derive(Default)]
struct Inner {
    subscribers: HashMap<SubscriberId, SubscriberRecord>,
    by_event: HashMap<EventType, Vec<Arc<Subscription>>>,
}

/// Snapshot of one subscriber's declaration.
#[derive(Debug, Clone)]
pub struct SubscriberMetadata {
    /// Declared type, including its factory.
    pub subscriber: SubscriberType,
    /// Subscriptions in declaration order.
    pub subscriptions: Vec<Arc<Subscription>>,
}

/// Append-only store of subscriber declarations.
#[derive(Default)]
pub struct SubscriptionRegistry {
    inner: RwLock<Inner>,
}

impl SubscriptionRegistry {
    /// Creates an empty, isolated registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    ///
    /// Created on first access; with the `auto-declare` feature every
    /// [`SubscriberDeclaration`](crate::SubscriberDeclaration) linked into the binary
    /// is applied before this returns for the first time.
    pub fn global() -> &'static SubscriptionRegistry {
        &GLOBAL
    }

    /// Ensures a record exists for `subscriber` and returns the recorded type.
    ///
    /// A factory supplied later fills in a record created without one.
    pub fn get_or_create(&self, subscriber: SubscriberType) -> SubscriberType {
        let mut inner = self.write();
        let record = inner
            .subscribers
            .entry(subscriber.id())
            .or_insert_with(|| SubscriberRecord {
                ty: subscriber,
                subscriptions: Vec::new(),
            });
        record.ty.merge(&subscriber);
        record.ty
    }

    /// Declares `S`, built with `S::default()` by the default container.
    pub fn subscriber<S>(&self) -> SubscriberBuilder<'_, S>
    where
        S: Default + Send + Sync + 'static,
    {
        self.get_or_create(SubscriberType::of::<S>());
        SubscriberBuilder::new(self)
    }

    /// Declares `S` without a factory; a custom container must provide instances.
    pub fn external_subscriber<S>(&self) -> SubscriberBuilder<'_, S>
    where
        S: Send + Sync + 'static,
    {
        self.get_or_create(SubscriberType::external::<S>());
        SubscriberBuilder::new(self)
    }

    /// Declares a subscriber and all of its subscriptions in one call.
    ///
    /// Returns how many entries were actually added (duplicates are skipped).
    pub fn register_subscriber(
        &self,
        subscriber: SubscriberType,
        entries: impl IntoIterator<Item = Subscription>,
    ) -> usize {
        self.get_or_create(subscriber);

        let mut added = 0;
        for entry in entries {
            if entry.subscriber() != subscriber.id() {
                tracing::warn!(
                    declared = subscriber.name(),
                    entry = entry.subscriber().name(),
                    method = entry.method(),
                    "subscription registered under a different subscriber"
                );
            }
            if self.add_subscription(entry) {
                added += 1;
            }
        }
        added
    }

    /// Adds one subscription to both indexes.
    ///
    /// Returns `false` (and changes nothing) if an entry with the same
    /// `(subscriber, method, event)` already exists. An unseen subscriber gets a
    /// record without a factory.
    pub fn add_subscription(&self, entry: Subscription) -> bool {
        let mut inner = self.write();
        let Inner {
            subscribers,
            by_event,
        } = &mut *inner;

        let record = subscribers
            .entry(entry.subscriber())
            .or_insert_with(|| SubscriberRecord {
                ty: SubscriberType::without_factory(entry.subscriber()),
                subscriptions: Vec::new(),
            });

        if record.subscriptions.iter().any(|e| e.same_key(&entry)) {
            tracing::trace!(
                subscriber = entry.subscriber().name(),
                method = entry.method(),
                event = entry.event().name(),
                "duplicate subscription ignored"
            );
            return false;
        }

        let entry = Arc::new(entry);
        record.subscriptions.push(Arc::clone(&entry));
        by_event.entry(entry.event()).or_default().push(entry);
        true
    }

    /// Subscriptions declared by `subscriber`, in declaration order.
    pub fn subscriptions_for(
        &self,
        subscriber: SubscriberId,
    ) -> Result<Vec<Arc<Subscription>>, DispatchError> {
        self.metadata_for(subscriber).map(|meta| meta.subscriptions)
    }

    /// Declared type and subscriptions of `subscriber`.
    pub fn metadata_for(&self, subscriber: SubscriberId) -> Result<SubscriberMetadata, DispatchError> {
        let inner = self.read();
        inner
            .subscribers
            .get(&subscriber)
            .map(|record| SubscriberMetadata {
                subscriber: record.ty,
                subscriptions: record.subscriptions.clone(),
            })
            .ok_or(DispatchError::UnknownSubscriber {
                subscriber: subscriber.name(),
            })
    }

    /// Subscriptions declared directly on `event` (ancestors not included).
    pub fn subscriptions_on(&self, event: EventType) -> Vec<Arc<Subscription>> {
        self.read()
            .by_event
            .get(&event)
            .cloned()
            .unwrap_or_default()
    }

    /// True if `subscriber` has been declared.
    pub fn contains(&self, subscriber: SubscriberId) -> bool {
        self.read().subscribers.contains_key(&subscriber)
    }

    /// Number of declared subscriber types.
    pub fn len(&self) -> usize {
        self.read().subscribers.len()
    }

    /// True if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.read().subscribers.is_empty()
    }

    /// Total number of subscriptions across all subscribers.
    pub fn subscription_count(&self) -> usize {
        self.read()
            .subscribers
            .values()
            .map(|record| record.subscriptions.len())
            .sum()
    }

    /// Forgets every declaration.
    ///
    /// Test isolation only: existing dispatchers keep their snapshot, and the
    /// global registry does not re-run its declarations afterwards.
    pub fn reset(&self) {
        let mut inner = self.write();
        inner.subscribers.clear();
        inner.by_event.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fluent declaration of one subscriber's handlers.
///
/// Obtained from [`SubscriptionRegistry::subscriber`] or
/// [`SubscriptionRegistry::external_subscriber`]; each call adds one subscription.
pub struct SubscriberBuilder<'r, S> {
    registry: &'r SubscriptionRegistry,
    _subscriber: PhantomData<fn() -> S>,
}

impl<'r, S> SubscriberBuilder<'r, S>
where
    S: Send + Sync + 'static,
{
    fn new(registry: &'r SubscriptionRegistry) -> Self {
        Self {
            registry,
            _subscriber: PhantomData,
        }
    }

    /// Subscribes the asynchronous `handler` (method `method`) to `E`.
    pub fn on<E: Event>(self, method: &'static str, options: On, handler: AsyncHandler<S, E>) -> Self {
        self.handle(method, options, Handler::Async(handler))
    }

    /// Subscribes the synchronous `handler` (method `method`) to `E`.
    pub fn on_sync<E: Event>(
        self,
        method: &'static str,
        options: On,
        handler: SyncHandler<S, E>,
    ) -> Self {
        self.handle(method, options, Handler::Sync(handler))
    }

    /// Subscribes one type-erased `handler` (method `method`) to every type in `events`.
    ///
    /// Each event type gets its own entry, so the identity key stays
    /// `(subscriber, method, event)`.
    pub fn on_each(
        self,
        method: &'static str,
        events: impl IntoIterator<Item = EventType>,
        options: On,
        handler: AnyHandler<S>,
    ) -> Self {
        for event in events {
            self.registry
                .add_subscription(Subscription::erased::<S>(method, event, options, handler));
        }
        self
    }

    /// Subscribes an already tagged handler to `E`.
    pub fn handle<E: Event>(self, method: &'static str, options: On, handler: Handler<S, E>) -> Self {
        self.registry
            .add_subscription(Subscription::new::<S, E>(method, options, handler));
        self
    }

    /// Identity of the subscriber being declared.
    pub fn id(&self) -> SubscriberId {
        SubscriberId::of::<S>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    use crate::subscribers::HandlerResult;

    struct Alpha;
    impl Event for Alpha {}

    struct Beta;
    impl Event for Beta {}

    #[derive(Default)]
    struct Watcher;

    impl Watcher {
        fn on_alpha(&self, _ev: &Alpha) -> HandlerResult {
            Ok(())
        }
        fn on_beta(&self, _ev: &Beta) -> HandlerResult {
            Ok(())
        }
    }

    struct Remote;

    impl Remote {
        fn on_alpha(&self, _ev: &Alpha) -> HandlerResult {
            Ok(())
        }
    }

    #[test]
    fn test_unknown_subscriber_is_an_error() {
        let registry = SubscriptionRegistry::new();
        let err = registry
            .subscriptions_for(SubscriberId::of::<Watcher>())
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownSubscriber {
                subscriber: std::any::type_name::<Watcher>()
            }
        );
    }

    #[test]
    fn test_declared_without_subscriptions_is_known() {
        let registry = SubscriptionRegistry::new();
        registry.subscriber::<Watcher>();

        assert!(registry.contains(SubscriberId::of::<Watcher>()));
        assert!(registry
            .subscriptions_for(SubscriberId::of::<Watcher>())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_both_indexes_are_filled_in_declaration_order() {
        let registry = SubscriptionRegistry::new();
        registry
            .subscriber::<Watcher>()
            .on_sync::<Alpha>("on_alpha", On::new().priority(1), Watcher::on_alpha)
            .on_sync::<Beta>("on_beta", On::new().background(), Watcher::on_beta);
        registry
            .external_subscriber::<Remote>()
            .on_sync::<Alpha>("on_alpha", On::new(), Remote::on_alpha);

        let methods: Vec<_> = registry
            .subscriptions_for(SubscriberId::of::<Watcher>())
            .unwrap()
            .iter()
            .map(|e| e.method())
            .collect();
        assert_eq!(methods, vec!["on_alpha", "on_beta"]);

        let on_alpha: Vec<_> = registry
            .subscriptions_on(EventType::of::<Alpha>())
            .iter()
            .map(|e| e.subscriber())
            .collect();
        assert_eq!(
            on_alpha,
            vec![SubscriberId::of::<Watcher>(), SubscriberId::of::<Remote>()]
        );
        assert!(registry.subscriptions_on(EventType::of::<Beta>())[0].is_background());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.subscription_count(), 3);
    }

    #[test]
    fn test_duplicate_key_is_ignored() {
        let registry = SubscriptionRegistry::new();
        let first = registry.add_subscription(Subscription::new::<Watcher, Alpha>(
            "on_alpha",
            On::new(),
            Handler::Sync(Watcher::on_alpha),
        ));
        let second = registry.add_subscription(Subscription::new::<Watcher, Alpha>(
            "on_alpha",
            On::new().priority(10),
            Handler::Sync(Watcher::on_alpha),
        ));

        assert!(first);
        assert!(!second);
        assert_eq!(registry.subscription_count(), 1);
        assert_eq!(registry.subscriptions_on(EventType::of::<Alpha>()).len(), 1);
        assert_eq!(
            registry.subscriptions_on(EventType::of::<Alpha>())[0].priority(),
            0
        );
    }

    #[test]
    fn test_on_each_adds_one_entry_per_event_type() {
        fn on_any<'a>(_s: &'a Watcher, _ev: &'a dyn Event) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async { Ok(()) })
        }

        let registry = SubscriptionRegistry::new();
        registry.subscriber::<Watcher>().on_each(
            "on_any",
            [EventType::of::<Alpha>(), EventType::of::<Beta>(), EventType::of::<Alpha>()],
            On::new().priority(3),
            on_any,
        );

        let entries = registry
            .subscriptions_for(SubscriberId::of::<Watcher>())
            .unwrap();
        let events: Vec<_> = entries.iter().map(|e| e.event()).collect();
        assert_eq!(events, vec![EventType::of::<Alpha>(), EventType::of::<Beta>()]);
        assert!(entries.iter().all(|e| e.method() == "on_any" && e.priority() == 3));
    }

    #[test]
    fn test_implicit_record_gets_factory_later() {
        let registry = SubscriptionRegistry::new();
        registry.add_subscription(Subscription::new::<Watcher, Alpha>(
            "on_alpha",
            On::new(),
            Handler::Sync(Watcher::on_alpha),
        ));
        let meta = registry.metadata_for(SubscriberId::of::<Watcher>()).unwrap();
        assert!(!meta.subscriber.has_factory());

        registry.subscriber::<Watcher>();
        let meta = registry.metadata_for(SubscriberId::of::<Watcher>()).unwrap();
        assert!(meta.subscriber.has_factory());
        assert_eq!(meta.subscriptions.len(), 1);
    }

    #[test]
    fn test_register_subscriber_batch() {
        let registry = SubscriptionRegistry::new();
        let added = registry.register_subscriber(
            SubscriberType::of::<Watcher>(),
            vec![
                Subscription::new::<Watcher, Alpha>("on_alpha", On::new(), Handler::Sync(Watcher::on_alpha)),
                Subscription::new::<Watcher, Beta>("on_beta", On::new(), Handler::Sync(Watcher::on_beta)),
                Subscription::new::<Watcher, Alpha>("on_alpha", On::new(), Handler::Sync(Watcher::on_alpha)),
            ],
        );
        assert_eq!(added, 2);
    }

    #[test]
    fn test_reset_forgets_everything() {
        let registry = SubscriptionRegistry::new();
        registry
            .subscriber::<Watcher>()
            .on_sync::<Alpha>("on_alpha", On::new(), Watcher::on_alpha);
        assert!(!registry.is_empty());

        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.subscriptions_on(EventType::of::<Alpha>()).is_empty());
        assert!(!registry.contains(SubscriberId::of::<Watcher>()));
    }
}
