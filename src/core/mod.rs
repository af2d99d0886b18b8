//! Dispatch core: listener compilation, bucketing and execution.
//!
//! The only public API from this module is [`Dispatcher`], its
//! [`DispatcherBuilder`] and [`DispatcherConfig`].
//!
//! Internal modules:
//! - [`listener`]: one subscription bound to a container and a logger, with failure isolation;
//! - [`buckets`]: declared listeners per event type and the per-type resolution cache;
//! - [`dispatcher`]: serial and background phases;
//! - [`builder`]: compiles a dispatcher from registry declarations.

mod buckets;
mod builder;
mod config;
mod dispatcher;
mod listener;

pub use builder::DispatcherBuilder;
pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
