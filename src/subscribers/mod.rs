//! # Subscribers: declaring which methods handle which events.
//!
//! A subscriber is any `Send + Sync + 'static` type whose methods handle events.
//! Declarations live in a [`SubscriptionRegistry`]; dispatchers are compiled from it.
//!
//! ## Architecture
//! ```text
//! declaration                          registry                       dispatcher
//!   registry.subscriber::<S>()  ──►  SubscriberId ─► [Subscription]  ──► Listener per entry
//!     .on::<E>(method, On, fn)       EventType    ─► [Subscription]      bucketed by EventType
//!   inventory::submit!(..)      ──►  (global registry, first access)
//! ```
//!
//! ## Contents
//! - [`Subscription`], [`Handler`], [`On`] one `(subscriber, method, event)` entry
//! - [`SubscriberId`], [`SubscriberType`] subscriber identity and factory
//! - [`SubscriptionRegistry`], [`SubscriberBuilder`] the metadata store
//! - `SubscriberDeclaration` link-time declarations (`auto-declare` feature)

#[cfg(feature = "auto-declare")]
mod declare;
mod registry;
mod subscription;

#[cfg(feature = "auto-declare")]
pub use declare::{declare_all, declared_subscribers, SubscriberDeclaration};
pub use registry::{SubscriberBuilder, SubscriberMetadata, SubscriptionRegistry};
pub use subscription::{
    AnyHandler, AsyncHandler, Handler, HandlerResult, On, SubscriberId, SubscriberType, Subscription,
    SyncHandler,
};
