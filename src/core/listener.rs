//! # Compiled listener: one subscription bound to a container and a logger.
//!
//! ## Invocation
//! ```text
//! invoke(event, phase)
//!   ├─► container.get(subscriber)  ─► Ready / Pending (awaited)
//!   │       └─ None               ─► Err(SubscriberResolution)
//!   ├─► handler(instance, event)   ─► wrong instance type ─► Err(SubscriberMismatch)
//!   └─► catch_unwind(call).await
//!           ├─ Ok(Ok(()))          ─► Ok(())
//!           ├─ Ok(Err(e))          ─► logger.error("listener failed"),   Ok(())
//!           └─ Err(panic)          ─► logger.error("listener panicked"), Ok(())
//! ```
//!
//! ## Rules
//! - Wiring errors (`DispatchError`) are returned to the caller.
//! - Handler failures and panics are reported once and swallowed.
//!
//! `AssertUnwindSafe` is used: a handler that panics while holding a lock can
//! leave its own state inconsistent.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::container::Container;
use crate::error::{DispatchError, HandlerError};
use crate::events::{Event, SharedEvent};
use crate::logger::{FailureCause, ListenerFailure, Logger, Phase};
use crate::subscribers::{SubscriberType, Subscription};

pub(crate) struct Listener {
    subscription: Arc<Subscription>,
    subscriber: SubscriberType,
    container: Arc<dyn Container>,
    logger: Arc<dyn Logger>,
    max_depth: usize,
}

impl Listener {
    pub(crate) fn new(
        subscription: Arc<Subscription>,
        subscriber: SubscriberType,
        container: Arc<dyn Container>,
        logger: Arc<dyn Logger>,
        max_depth: usize,
    ) -> Self {
        Self {
            subscription,
            subscriber,
            container,
            logger,
            max_depth,
        }
    }

    #[inline]
    pub(crate) fn priority(&self) -> i32 {
        self.subscription.priority()
    }

    #[inline]
    pub(crate) fn is_background(&self) -> bool {
        self.subscription.is_background()
    }

    /// Runs the handler for `event`.
    pub(crate) async fn invoke(&self, event: &SharedEvent, phase: Phase) -> Result<(), DispatchError> {
        let instance = self
            .container
            .get(&self.subscriber)
            .resolve()
            .await
            .ok_or(DispatchError::SubscriberResolution {
                subscriber: self.subscriber.name(),
            })?;

        let call = (self.subscription.handler())(instance, Arc::clone(event), self.max_depth)?;

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.report("listener failed", event.as_ref(), phase, err.into()),
            Err(panic) => self.report(
                "listener panicked",
                event.as_ref(),
                phase,
                HandlerError::from_panic(panic.as_ref()).into(),
            ),
        }
        Ok(())
    }

    /// Reports a failure of this listener to the logger.
    pub(crate) fn report(&self, message: &str, event: &dyn Event, phase: Phase, error: FailureCause) {
        let failure = ListenerFailure {
            subscriber: self.subscriber.name(),
            method: self.subscription.method(),
            event: event.event_type().name(),
            declared_on: self.subscription.event().name(),
            phase,
            error,
        };
        self.logger.error(message, &failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerFn, Resolution, SingletonContainer};
    use crate::logger::testing::RecordingLogger;
    use crate::subscribers::{Handler, HandlerResult, On};

    struct Tick;
    impl Event for Tick {}

    #[derive(Default)]
    struct Clock;

    impl Clock {
        fn ok(&self, _ev: &Tick) -> HandlerResult {
            Ok(())
        }
        fn fails(&self, _ev: &Tick) -> HandlerResult {
            Err(HandlerError::fail("clock skew"))
        }
        fn panics(&self, _ev: &Tick) -> HandlerResult {
            panic!("clock stopped")
        }
    }

    fn listener(
        method: &'static str,
        handler: fn(&Clock, &Tick) -> HandlerResult,
        container: Arc<dyn Container>,
        logger: Arc<RecordingLogger>,
    ) -> Listener {
        Listener::new(
            Arc::new(Subscription::new::<Clock, Tick>(method, On::new(), Handler::Sync(handler))),
            SubscriberType::of::<Clock>(),
            container,
            logger,
            64,
        )
    }

    #[tokio::test]
    async fn test_success_logs_nothing() {
        let logger = Arc::new(RecordingLogger::default());
        let l = listener("ok", Clock::ok, Arc::new(SingletonContainer::new()), Arc::clone(&logger));
        let event: SharedEvent = Arc::new(Tick);

        assert_eq!(l.invoke(&event, Phase::Serial).await, Ok(()));
        assert_eq!(logger.len(), 0);
    }

    #[tokio::test]
    async fn test_handler_error_is_logged_and_swallowed() {
        let logger = Arc::new(RecordingLogger::default());
        let l = listener("fails", Clock::fails, Arc::new(SingletonContainer::new()), Arc::clone(&logger));
        let event: SharedEvent = Arc::new(Tick);

        assert_eq!(l.invoke(&event, Phase::Background).await, Ok(()));
        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "listener failed");
        assert_eq!(entries[0].1.method, "fails");
        assert_eq!(entries[0].1.phase, Phase::Background);
        assert_eq!(
            entries[0].1.error,
            FailureCause::Handler(HandlerError::fail("clock skew"))
        );
    }

    #[tokio::test]
    async fn test_panic_is_caught() {
        let logger = Arc::new(RecordingLogger::default());
        let l = listener("panics", Clock::panics, Arc::new(SingletonContainer::new()), Arc::clone(&logger));
        let event: SharedEvent = Arc::new(Tick);

        assert_eq!(l.invoke(&event, Phase::Serial).await, Ok(()));
        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "listener panicked");
        assert_eq!(
            entries[0].1.error,
            FailureCause::Handler(HandlerError::Panicked {
                info: "clock stopped".into()
            })
        );
    }

    #[tokio::test]
    async fn test_unresolved_instance_is_returned() {
        let logger = Arc::new(RecordingLogger::default());
        let empty: Arc<dyn Container> = ContainerFn::arc(|_: &SubscriberType| Resolution::none());
        let l = listener("ok", Clock::ok, empty, Arc::clone(&logger));
        let event: SharedEvent = Arc::new(Tick);

        let err = l.invoke(&event, Phase::Serial).await.unwrap_err();
        assert_eq!(err.as_label(), "subscriber_resolution");
        assert_eq!(logger.len(), 0);
    }

    #[tokio::test]
    async fn test_mismatched_instance_is_returned() {
        let logger = Arc::new(RecordingLogger::default());
        let wrong: Arc<dyn Container> =
            ContainerFn::arc(|_: &SubscriberType| Resolution::ready(Arc::new("not a clock")));
        let l = listener("ok", Clock::ok, wrong, Arc::clone(&logger));
        let event: SharedEvent = Arc::new(Tick);

        let err = l.invoke(&event, Phase::Serial).await.unwrap_err();
        assert_eq!(
            err,
            DispatchError::SubscriberMismatch {
                subscriber: std::any::type_name::<Clock>()
            }
        );
    }
}
