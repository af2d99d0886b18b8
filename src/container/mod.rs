//! # Containers: where subscriber instances come from.
//!
//! ## Contents
//! - [`Container`], [`Resolution`], [`Instance`] the lookup contract
//! - [`SingletonContainer`] default, one instance per subscriber type
//! - [`ContainerFn`] closure-backed container
//! - [`AsyncContainer`], [`AsyncResolver`] containers with async lookups
//!
//! ```text
//! Listener::invoke(event)
//!     └─► Container::get(&SubscriberType)
//!             ├─► Ready(Some(instance))  ─► call handler
//!             ├─► Pending(fut) ─► await ─► Some(instance) ─► call handler
//!             └─► None (now or later) ─► DispatchError::SubscriberResolution
//! ```

mod async_container;
mod container_fn;
mod resolution;
mod singleton;

pub use async_container::{AsyncContainer, AsyncResolver};
pub use container_fn::ContainerFn;
pub use resolution::{Container, Instance, Resolution};
pub use singleton::SingletonContainer;
