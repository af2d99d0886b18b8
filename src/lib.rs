//! # eventvisor
//!
//! **Eventvisor** is an in-process, typed event dispatcher for async Rust.
//!
//! Subscriber types declare which of their methods handle which event types.
//! A [`Dispatcher`] compiles those declarations into ordered listener lists and,
//! for every dispatched event, runs the matching listeners with priorities,
//! event inheritance, a serial and a background phase, and isolated failures.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  declarations (explicit calls or inventory::submit!)
//!        │
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SubscriptionRegistry (metadata store)                            │
//! │  - SubscriberId ─► SubscriberType + [Subscription]                │
//! │  - EventType    ─► [Subscription]                                 │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ DispatcherBuilder::build (snapshot)
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - declared buckets: EventType ─► { serial, background }          │
//! │  - resolved cache:   concrete TypeId ─► sorted { serial, bg }     │
//! │  - Container (SingletonContainer by default)                      │
//! │  - Logger (LogWriter by default)                                  │
//! │  - TaskTracker (background phases)                                │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!   dispatch(event) ─► serial listeners, awaited in priority order
//!                   └► background listeners, spawned after the serial phase
//! ```
//!
//! ### Inheritance
//! Events form chains by composition: a child event embeds its parent value and
//! returns it from [`Event::parent`]. Listeners declared on an ancestor receive the
//! embedded ancestor; listeners of the whole chain are merged and ordered by priority.
//! ```text
//! ConversionEvent ─parent─► ImpressionOrConversionEvent ─parent─► BaseEvent
//!   [onConversion p2]        [onConversionOrImpression p-99]       [allEventLogger bg]
//! ```
//!
//! ### Failure model
//! - Handler errors and panics are caught, reported once to the [`Logger`] and swallowed.
//! - Wiring errors ([`DispatchError`]) are returned: undeclared subscribers at construction,
//!   unresolvable instances during the serial phase, and a missing tokio runtime when
//!   an event has background listeners.
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                                    |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------------------|
//! | **Events**        | Event types, parent chains, propagation stop.                 | [`Event`], [`EventType`], [`Propagation`]             |
//! | **Subscribers**   | Declaring handlers with priority and background options.      | [`SubscriptionRegistry`], [`Subscription`], [`On`]    |
//! | **Containers**    | Where subscriber instances come from.                         | [`Container`], [`SingletonContainer`], [`AsyncContainer`] |
//! | **Dispatch**      | Ordered serial and background execution.                      | [`Dispatcher`], [`DispatcherBuilder`]                 |
//! | **Logging**       | Reporting isolated failures.                                  | [`Logger`], [`LogWriter`], [`ListenerFailure`]        |
//! | **Errors**        | Typed wiring and handler errors.                              | [`DispatchError`], [`HandlerError`]                   |
//! | **Configuration** | Ancestor depth bound, propagation handling.                   | [`DispatcherConfig`]                                  |
//!
//! ## Optional features
//! - `auto-declare` (default): link-time subscriber declarations via [`inventory`],
//!   applied by [`SubscriptionRegistry::global`].
//!
//! ## Example
//! ```rust
//! use eventvisor::{Dispatcher, Event, HandlerResult, On, SubscriberId, SubscriptionRegistry};
//!
//! #[derive(Default)]
//! struct UserEvent {
//!     user: String,
//! }
//! impl Event for UserEvent {}
//!
//! struct UserSignedUp {
//!     base: UserEvent,
//! }
//! impl Event for UserSignedUp {
//!     fn parent(&self) -> Option<&dyn Event> {
//!         Some(&self.base)
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Mailer;
//!
//! impl Mailer {
//!     async fn welcome(&self, ev: &UserSignedUp) -> HandlerResult {
//!         println!("welcome {}", ev.base.user);
//!         Ok(())
//!     }
//!
//!     fn audit(&self, ev: &UserEvent) -> HandlerResult {
//!         println!("audit {}", ev.user);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SubscriptionRegistry::new();
//!     registry
//!         .subscriber::<Mailer>()
//!         .on::<UserSignedUp>("welcome", On::new().priority(10), |s, e| Box::pin(s.welcome(e)))
//!         .on_sync::<UserEvent>("audit", On::new().background(), Mailer::audit);
//!
//!     let dispatcher = Dispatcher::new(&registry, [SubscriberId::of::<Mailer>()])?;
//!     dispatcher
//!         .dispatch(UserSignedUp { base: UserEvent { user: "ada".into() } })
//!         .await?;
//!
//!     // wait for the background audit
//!     dispatcher.flush().await;
//!     Ok(())
//! }
//! ```
mod container;
mod core;
mod error;
mod events;
mod logger;
mod subscribers;

// ---- Public re-exports ----

pub use container::{AsyncContainer, AsyncResolver, Container, ContainerFn, Instance, Resolution, SingletonContainer};
pub use self::core::{Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::{DispatchError, HandlerError};
pub use events::{Event, EventAny, EventType, Propagation, SharedEvent};
pub use logger::{FailureCause, ListenerFailure, LogWriter, Logger, Phase};
pub use subscribers::{
    AnyHandler, AsyncHandler, Handler, HandlerResult, On, SubscriberBuilder, SubscriberId, SubscriberMetadata,
    SubscriberType, Subscription, SubscriptionRegistry, SyncHandler,
};

// Link-time declarations.
// Disable with: `--no-default-features`
#[cfg(feature = "auto-declare")]
pub use inventory;
#[cfg(feature = "auto-declare")]
pub use subscribers::{declare_all, declared_subscribers, SubscriberDeclaration};
