//! Dispatchable events: the event trait, type descriptors and propagation control.
//!
//! ## Contents
//! - [`Event`], [`EventAny`] dispatchable types and their ancestor accessor
//! - [`EventType`] nominal identity used to key listener buckets
//! - [`Propagation`] embeddable "stop propagation" flag
//!
//! Dispatch walks the ancestor chain through [`Event::parent`], bounded by
//! [`DispatcherConfig::max_ancestor_depth`](crate::DispatcherConfig::max_ancestor_depth).

mod event;
mod propagation;

pub use event::{Event, EventAny, EventType, SharedEvent};
pub use propagation::Propagation;

pub(crate) use event::{ancestor_chain, find_in_chain, find_type_in_chain};
