//! # Dispatcher: ordered, inheritance-aware event fan-out.
//!
//! The [`Dispatcher`] owns the compiled listeners of its subscribers and runs them
//! for every dispatched event in two phases.
//!
//! ## High-level architecture
//! ```text
//! Construction (DispatcherBuilder::build):
//!   [SubscriberId, ..] ─► registry.metadata_for(id)?  ─► Listener per subscription
//!                                                         └─► declared bucket of its event type
//!
//! dispatch(event):
//!   resolve bucket for the concrete type (ancestor walk, stable priority sort, cached)
//!        │
//!        ├─ serial phase (caller's task, awaited one by one)
//!        │     for listener in serial:
//!        │        ├─ propagation stopped? ─► return Ok(event)
//!        │        └─ listener.invoke(event)?        (wiring error ─► return Err, no background)
//!        │
//!        └─ background phase (one spawned task, tracked)
//!              join_all(background listeners, started in priority order)
//!                 └─ wiring error ─► Logger
//!
//! flush(): wait for every background task spawned so far
//! ```
//!
//! ## Rules
//! - `dispatch` resolves once the serial phase is done; background listeners run later.
//! - Handler errors and panics never reach the caller (they go to the [`Logger`](crate::Logger)).
//! - Declarations added to the registry after construction are not seen.
//! - Events with background listeners need a tokio runtime; events without them
//!   can be dispatched from any executor.
//!
//! ## Runtime flavor
//! Background listeners always start after the serial phase has finished, so its
//! effects are visible to them. On a current-thread runtime they also cannot start
//! before the dispatching task yields, which means nothing they do is visible right
//! after `dispatch(..).await` returns. On a multi-thread runtime another worker may
//! pick them up at once and run them in parallel with the caller; use
//! [`Dispatcher::flush`] to wait for them there.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Dispatcher, Event, HandlerResult, On, SubscriberId, SubscriptionRegistry};
//!
//! struct OrderPlaced {
//!     total: u64,
//! }
//! impl Event for OrderPlaced {}
//!
//! #[derive(Default)]
//! struct Receipts;
//!
//! impl Receipts {
//!     async fn send(&self, ev: &OrderPlaced) -> HandlerResult {
//!         assert!(ev.total > 0);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SubscriptionRegistry::new();
//!     registry
//!         .subscriber::<Receipts>()
//!         .on::<OrderPlaced>("send", On::new(), |s, e| Box::pin(s.send(e)));
//!
//!     let dispatcher = Dispatcher::new(&registry, [SubscriberId::of::<Receipts>()])?;
//!     let event = dispatcher.dispatch(OrderPlaced { total: 42 }).await?;
//!     assert_eq!(event.total, 42);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use futures::future::join_all;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

use super::buckets::{Bucket, Buckets};
use super::builder::DispatcherBuilder;
use super::config::DispatcherConfig;
use super::listener::Listener;
use crate::error::DispatchError;
use crate::events::{Event, EventType, SharedEvent};
use crate::logger::Phase;
use crate::subscribers::{SubscriberId, SubscriptionRegistry};

/// Runs the listeners of its subscribers for dispatched events.
pub struct Dispatcher {
    buckets: Buckets,
    config: DispatcherConfig,
    subscribers: usize,
    tracker: TaskTracker,
}

impl Dispatcher {
    /// Builds a dispatcher for `subscribers` with the default container, logger and config.
    ///
    /// Fails with [`DispatchError::UnknownSubscriber`] if any of them was never declared.
    pub fn new(
        registry: &SubscriptionRegistry,
        subscribers: impl IntoIterator<Item = SubscriberId>,
    ) -> Result<Self, DispatchError> {
        DispatcherBuilder::new(registry)
            .with_subscribers(subscribers)
            .build()
    }

    /// Returns a builder reading declarations from `registry`.
    pub fn builder(registry: &SubscriptionRegistry) -> DispatcherBuilder<'_> {
        DispatcherBuilder::new(registry)
    }

    pub(crate) fn from_parts(buckets: Buckets, config: DispatcherConfig, subscribers: usize) -> Self {
        Self {
            buckets,
            config,
            subscribers,
            tracker: TaskTracker::new(),
        }
    }

    /// Dispatches `event` and returns it once the serial phase is done.
    ///
    /// Only wiring failures are returned; see [`DispatchError`]. When the event has
    /// background listeners and no tokio runtime is running, this fails with
    /// [`DispatchError::NoRuntime`] before any listener runs. See the module docs
    /// for how the runtime flavor affects when background listeners start.
    pub async fn dispatch<E: Event>(&self, event: E) -> Result<Arc<E>, DispatchError> {
        let event = Arc::new(event);
        self.dispatch_arc(Arc::clone(&event)).await?;
        Ok(event)
    }

    /// Dispatches an already shared event.
    pub async fn dispatch_arc<E: Event>(&self, event: Arc<E>) -> Result<(), DispatchError> {
        let shared: SharedEvent = event;
        self.dispatch_shared(shared).await
    }

    /// Dispatches a type-erased event.
    pub async fn dispatch_shared(&self, event: SharedEvent) -> Result<(), DispatchError> {
        let bucket = self.buckets.resolve(event.as_ref());
        if bucket.is_empty() {
            tracing::trace!(event = event.as_ref().event_type().name(), "no listeners");
            return Ok(());
        }
        let runtime = if bucket.background.is_empty() {
            None
        } else {
            let handle = Handle::try_current().map_err(|_| DispatchError::NoRuntime {
                event: event.as_ref().event_type().name(),
            })?;
            Some(handle)
        };

        for listener in &bucket.serial {
            if self.is_stopped(event.as_ref()) {
                tracing::debug!(
                    event = event.as_ref().event_type().name(),
                    "propagation stopped during serial phase"
                );
                return Ok(());
            }
            listener.invoke(&event, Phase::Serial).await?;
        }

        if let Some(handle) = runtime {
            if !self.is_stopped(event.as_ref()) {
                self.spawn_background(bucket, event, &handle);
            }
        }
        Ok(())
    }

    /// Waits until every background phase spawned so far has finished.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Number of background phases still running.
    pub fn pending_background(&self) -> usize {
        self.tracker.len()
    }

    /// Listeners declared directly on `E` (ancestors not included).
    pub fn listener_count<E: Event>(&self) -> usize {
        self.buckets.declared_len(EventType::of::<E>())
    }

    /// Listeners a dispatch of `event` would run, ancestors included.
    pub fn resolved_listener_count(&self, event: &dyn Event) -> usize {
        self.buckets.resolve(event).len()
    }

    /// Number of distinct subscriber types compiled in.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    fn is_stopped(&self, event: &dyn Event) -> bool {
        self.config.respect_propagation && event.is_propagation_stopped()
    }

    fn spawn_background(&self, bucket: Arc<Bucket>, event: SharedEvent, handle: &Handle) {
        tracing::trace!(
            event = event.as_ref().event_type().name(),
            listeners = bucket.background.len(),
            flavor = ?handle.runtime_flavor(),
            "background phase scheduled"
        );
        self.tracker.spawn_on(run_background(bucket, event), handle);
    }
}

/// Starts every background listener in priority order and drives them concurrently.
async fn run_background(bucket: Arc<Bucket>, event: SharedEvent) {
    join_all(
        bucket
            .background
            .iter()
            .map(|listener| run_isolated(listener, &event)),
    )
    .await;
}

async fn run_isolated(listener: &Listener, event: &SharedEvent) {
    if let Err(err) = listener.invoke(event, Phase::Background).await {
        listener.report(
            "background listener could not run",
            event.as_ref(),
            Phase::Background,
            err.into(),
        );
    }
}
