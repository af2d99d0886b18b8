//! # Subscription entries: who handles what, how early, and where.
//!
//! A [`Subscription`] records that method `method` of subscriber type `S`
//! handles event type `E`, with a priority and a serial/background flag.
//! Its identity is `(subscriber, method, event)`; see
//! [`SubscriptionRegistry::add_subscription`](crate::SubscriptionRegistry::add_subscription).
//!
//! Handlers are plain function pointers, either synchronous or returning a boxed future:
//! ```text
//! Handler::Sync(fn(&S, &E) -> HandlerResult)
//! Handler::Async(for<'a> fn(&'a S, &'a E) -> BoxFuture<'a, HandlerResult>)
//! ```
//!
//! ## Example
//! ```rust
//! use eventvisor::{Event, Handler, HandlerResult, On, Subscription};
//!
//! struct Signup;
//! impl Event for Signup {}
//!
//! #[derive(Default)]
//! struct Welcome;
//!
//! impl Welcome {
//!     async fn send(&self, _ev: &Signup) -> HandlerResult {
//!         Ok(())
//!     }
//! }
//!
//! let entry = Subscription::new::<Welcome, Signup>(
//!     "send",
//!     On::new().priority(5),
//!     Handler::Async(|s, e| Box::pin(s.send(e))),
//! );
//! assert_eq!(entry.priority(), 5);
//! assert!(!entry.is_background());
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::container::Instance;
use crate::error::{DispatchError, HandlerError};
use crate::events::{find_in_chain, find_type_in_chain, Event, EventType, SharedEvent};

/// Result returned by subscriber handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Synchronous handler method.
pub type SyncHandler<S, E> = fn(&S, &E) -> HandlerResult;

/// Asynchronous handler method.
pub type AsyncHandler<S, E> = for<'a> fn(&'a S, &'a E) -> BoxFuture<'a, HandlerResult>;

/// Handler method shared by several event types; receives the matching chain member.
///
/// Downcast with [`EventAny::as_any`](crate::EventAny::as_any) to reach the concrete type.
pub type AnyHandler<S> = for<'a> fn(&'a S, &'a dyn Event) -> BoxFuture<'a, HandlerResult>;

/// A handler method, tagged by whether it has to be awaited.
pub enum Handler<S, E> {
    /// Completes before returning.
    Sync(SyncHandler<S, E>),
    /// Completes when the returned future settles.
    Async(AsyncHandler<S, E>),
}

impl<S, E> Clone for Handler<S, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, E> Copy for Handler<S, E> {}

/// Type-erased handler call: checks the instance type, then builds the invocation future.
pub(crate) type ErasedHandler = Arc<
    dyn Fn(Instance, SharedEvent, usize) -> Result<BoxFuture<'static, HandlerResult>, DispatchError>
        + Send
        + Sync,
>;

/// Nominal identity of a subscriber type.
#[derive(Clone, Copy)]
pub struct SubscriberId {
    id: TypeId,
    name: &'static str,
}

impl SubscriberId {
    /// Identity of `S`.
    #[inline]
    pub fn of<S: 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    /// Fully qualified type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True if this identifies `S`.
    #[inline]
    pub fn is<S: 'static>(&self) -> bool {
        self.id == TypeId::of::<S>()
    }
}

impl PartialEq for SubscriberId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubscriberId {}

impl Hash for SubscriberId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declared subscriber type: identity plus an optional no-argument factory.
///
/// The factory is what [`SingletonContainer`](crate::SingletonContainer) uses to
/// build instances; subscribers without one need a custom container.
#[derive(Clone, Copy)]
pub struct SubscriberType {
    id: SubscriberId,
    factory: Option<fn() -> Instance>,
}

fn build_default<S: Default + Send + Sync + 'static>() -> Instance {
    Arc::new(S::default())
}

impl SubscriberType {
    /// Subscriber built with `S::default()`.
    pub fn of<S: Default + Send + Sync + 'static>() -> Self {
        Self {
            id: SubscriberId::of::<S>(),
            factory: Some(build_default::<S>),
        }
    }

    /// Subscriber that only a custom container can build.
    pub fn external<S: Send + Sync + 'static>() -> Self {
        Self {
            id: SubscriberId::of::<S>(),
            factory: None,
        }
    }

    /// Record for a subscriber first seen through one of its subscriptions.
    pub(crate) fn without_factory(id: SubscriberId) -> Self {
        Self { id, factory: None }
    }

    #[inline]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// True if this describes `S`.
    #[inline]
    pub fn is<S: 'static>(&self) -> bool {
        self.id.is::<S>()
    }

    #[inline]
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Builds a fresh instance with the declared factory, if any.
    pub fn construct(&self) -> Option<Instance> {
        self.factory.map(|build| build())
    }

    /// Keeps the first factory seen for this type.
    pub(crate) fn merge(&mut self, other: &SubscriberType) {
        if self.factory.is_none() {
            self.factory = other.factory;
        }
    }
}

impl fmt::Debug for SubscriberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberType")
            .field("name", &self.name())
            .field("has_factory", &self.has_factory())
            .finish()
    }
}

/// Per-subscription options.
///
/// - `priority`: higher runs earlier (default `0`)
/// - `background`: run after the serial phase, without being awaited (default `false`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct On {
    priority: i32,
    background: bool,
}

impl On {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the priority.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the subscription as background.
    #[must_use]
    pub fn background(mut self) -> Self {
        self.background = true;
        self
    }
}

/// One `(subscriber, method, event)` subscription.
pub struct Subscription {
    subscriber: SubscriberId,
    method: &'static str,
    event: EventType,
    priority: i32,
    background: bool,
    handler: ErasedHandler,
}

impl Subscription {
    /// Builds the entry for `S::method` handling `E`.
    pub fn new<S, E>(method: &'static str, options: On, handler: Handler<S, E>) -> Self
    where
        S: Send + Sync + 'static,
        E: Event,
    {
        Self {
            subscriber: SubscriberId::of::<S>(),
            method,
            event: EventType::of::<E>(),
            priority: options.priority,
            background: options.background,
            handler: erase::<S, E>(handler),
        }
    }

    /// Builds the entry for `S::method` handling the event type `event`,
    /// with a handler that receives the event type-erased.
    pub fn erased<S>(method: &'static str, event: EventType, options: On, handler: AnyHandler<S>) -> Self
    where
        S: Send + Sync + 'static,
    {
        Self {
            subscriber: SubscriberId::of::<S>(),
            method,
            event,
            priority: options.priority,
            background: options.background,
            handler: erase_any::<S>(event, handler),
        }
    }

    #[inline]
    pub fn subscriber(&self) -> SubscriberId {
        self.subscriber
    }

    #[inline]
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Declared event type (possibly an ancestor of what gets dispatched).
    #[inline]
    pub fn event(&self) -> EventType {
        self.event
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub fn is_background(&self) -> bool {
        self.background
    }

    /// True if both entries share the `(subscriber, method, event)` identity.
    pub fn same_key(&self, other: &Subscription) -> bool {
        self.subscriber == other.subscriber
            && self.method == other.method
            && self.event == other.event
    }

    pub(crate) fn handler(&self) -> &ErasedHandler {
        &self.handler
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subscriber", &self.subscriber)
            .field("method", &self.method)
            .field("event", &self.event)
            .field("priority", &self.priority)
            .field("background", &self.background)
            .finish()
    }
}

fn erase<S, E>(handler: Handler<S, E>) -> ErasedHandler
where
    S: Send + Sync + 'static,
    E: Event,
{
    Arc::new(move |instance: Instance, event: SharedEvent, max_depth: usize| {
        if !instance.is::<S>() {
            return Err(DispatchError::SubscriberMismatch {
                subscriber: std::any::type_name::<S>(),
            });
        }

        let call: BoxFuture<'static, HandlerResult> = Box::pin(async move {
            let subscriber = instance
                .downcast_ref::<S>()
                .ok_or_else(|| HandlerError::fail("subscriber instance changed type"))?;
            let ev = find_in_chain::<E>(event.as_ref(), max_depth).ok_or_else(|| {
                HandlerError::fail(format!(
                    "event does not extend {}",
                    std::any::type_name::<E>()
                ))
            })?;

            match handler {
                Handler::Sync(f) => f(subscriber, ev),
                Handler::Async(f) => f(subscriber, ev).await,
            }
        });
        Ok(call)
    })
}

fn erase_any<S>(declared: EventType, handler: AnyHandler<S>) -> ErasedHandler
where
    S: Send + Sync + 'static,
{
    Arc::new(move |instance: Instance, event: SharedEvent, max_depth: usize| {
        if !instance.is::<S>() {
            return Err(DispatchError::SubscriberMismatch {
                subscriber: std::any::type_name::<S>(),
            });
        }

        let call: BoxFuture<'static, HandlerResult> = Box::pin(async move {
            let subscriber = instance
                .downcast_ref::<S>()
                .ok_or_else(|| HandlerError::fail("subscriber instance changed type"))?;
            let ev = find_type_in_chain(event.as_ref(), declared, max_depth).ok_or_else(|| {
                HandlerError::fail(format!("event does not extend {}", declared.name()))
            })?;
            handler(subscriber, ev).await
        });
        Ok(call)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl Event for Ping {}

    #[derive(Default)]
    struct Pong;

    impl Pong {
        fn on_ping(&self, _ev: &Ping) -> HandlerResult {
            Ok(())
        }
    }

    #[test]
    fn test_identity_ignores_options() {
        let a = Subscription::new::<Pong, Ping>("on_ping", On::new(), Handler::Sync(Pong::on_ping));
        let b = Subscription::new::<Pong, Ping>(
            "on_ping",
            On::new().priority(9).background(),
            Handler::Sync(Pong::on_ping),
        );
        let c = Subscription::new::<Pong, Ping>("other", On::new(), Handler::Sync(Pong::on_ping));

        assert!(a.same_key(&b));
        assert!(!a.same_key(&c));
        assert_eq!(b.priority(), 9);
        assert!(b.is_background());
    }

    #[tokio::test]
    async fn test_erased_handler_rejects_wrong_instance() {
        let entry = Subscription::new::<Pong, Ping>("on_ping", On::new(), Handler::Sync(Pong::on_ping));
        let wrong: Instance = Arc::new(42_u32);
        let event: SharedEvent = Arc::new(Ping);

        let err = (entry.handler())(wrong, Arc::clone(&event), 8).err();
        assert_eq!(
            err,
            Some(DispatchError::SubscriberMismatch {
                subscriber: std::any::type_name::<Pong>()
            })
        );

        let right: Instance = Arc::new(Pong);
        let call = (entry.handler())(right, event, 8).expect("matching instance");
        assert_eq!(call.await, Ok(()));
    }

    #[tokio::test]
    async fn test_erased_handler_receives_declared_member() {
        struct Echo {
            ping: Ping,
        }
        impl Event for Echo {
            fn parent(&self) -> Option<&dyn Event> {
                Some(&self.ping)
            }
        }

        fn expect_ping<'a>(_s: &'a Pong, ev: &'a dyn Event) -> BoxFuture<'a, HandlerResult> {
            let is_ping = ev.as_any().is::<Ping>();
            Box::pin(async move {
                if is_ping {
                    Ok(())
                } else {
                    Err(HandlerError::fail("not a ping"))
                }
            })
        }

        let entry = Subscription::erased::<Pong>(
            "expect_ping",
            EventType::of::<Ping>(),
            On::new().background(),
            expect_ping,
        );
        assert_eq!(entry.event(), EventType::of::<Ping>());
        assert!(entry.is_background());

        let event: SharedEvent = Arc::new(Echo { ping: Ping });
        let instance: Instance = Arc::new(Pong);
        let call = (entry.handler())(instance, event, 8).expect("matching instance");
        assert_eq!(call.await, Ok(()));
    }

    #[test]
    fn test_subscriber_type_factories() {
        let built = SubscriberType::of::<Pong>();
        let external = SubscriberType::external::<Pong>();

        assert_eq!(built.id(), external.id());
        assert!(built.has_factory());
        assert!(!external.has_factory());
        assert!(built.construct().is_some());
        assert!(external.construct().is_none());

        let mut merged = external;
        merged.merge(&built);
        assert!(merged.has_factory());
    }
}
