//! # Dispatchable events and their ancestor chains.
//!
//! The [`Event`] trait marks a type as dispatchable. Rust has no class inheritance,
//! so an event type "extends" another by **embedding** it and returning it from
//! [`Event::parent`]. Listeners declared on an ancestor type fire for every
//! descendant and receive a reference to the embedded ancestor value.
//!
//! ## Chain walk
//! ```text
//! ConversionEvent ──parent()──► TrackingEvent ──parent()──► BaseEvent ──parent()──► None
//!       (concrete)                 (ancestor)                 (root)
//! ```
//!
//! ## Rules
//! - The chain must be **structural**: every value of a type reports the same parent type.
//! - Chains are walked iteratively and bounded by
//!   [`DispatcherConfig::max_ancestor_depth`](crate::DispatcherConfig::max_ancestor_depth).
//!
//! ## Example
//! ```rust
//! use eventvisor::{Event, EventAny, EventType};
//!
//! struct BaseEvent;
//! impl Event for BaseEvent {}
//!
//! struct UserCreated {
//!     base: BaseEvent,
//!     email: String,
//! }
//!
//! impl Event for UserCreated {
//!     fn parent(&self) -> Option<&dyn Event> {
//!         Some(&self.base)
//!     }
//! }
//!
//! let ev = UserCreated { base: BaseEvent, email: "a@b.c".into() };
//! assert_eq!(ev.event_type(), EventType::of::<UserCreated>());
//! assert_eq!(ev.parent().map(|p| p.event_type()), Some(EventType::of::<BaseEvent>()));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared, type-erased event as carried through a dispatch.
pub type SharedEvent = Arc<dyn Event>;

/// A dispatchable event type.
///
/// Implementors only need an empty `impl`; both methods have defaults.
pub trait Event: EventAny + Send + Sync + 'static {
    /// Embedded parent event, if this type extends another one.
    fn parent(&self) -> Option<&dyn Event> {
        None
    }

    /// Whether a listener asked to stop propagating this event.
    ///
    /// Checked before every serial listener and before the background phase.
    /// Embed a [`Propagation`](crate::Propagation) to support it.
    fn is_propagation_stopped(&self) -> bool {
        false
    }
}

/// Object-safe access to the concrete type behind a `dyn Event`.
///
/// Blanket-implemented for every `'static` type; never implement it by hand.
pub trait EventAny: Any {
    /// Borrows the value as `dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Descriptor of the concrete type.
    fn event_type(&self) -> EventType;
}

impl<T: Any> EventAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn event_type(&self) -> EventType {
        EventType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

/// Nominal identity of an event type.
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for logs.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// Descriptor for `E`.
    #[inline]
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    /// Type identifier used as the registry key.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Collects the event types of `event` and its ancestors, concrete type first.
///
/// Stops after `max_depth` entries even if the chain continues.
pub(crate) fn ancestor_chain(event: &dyn Event, max_depth: usize) -> Vec<EventType> {
    let mut chain = Vec::new();
    let mut current = Some(event);
    while let Some(ev) = current {
        if chain.len() >= max_depth {
            tracing::warn!(
                event = event.event_type().name(),
                max_depth,
                "event ancestor chain truncated"
            );
            break;
        }
        chain.push(ev.event_type());
        current = ev.parent();
    }
    chain
}

/// Finds the value of type `T` in the ancestor chain of `event` (including itself).
pub(crate) fn find_in_chain<T: Event>(event: &dyn Event, max_depth: usize) -> Option<&T> {
    find_type_in_chain(event, EventType::of::<T>(), max_depth)?
        .as_any()
        .downcast_ref::<T>()
}

/// Finds the chain member whose concrete type is `ty`.
pub(crate) fn find_type_in_chain(
    event: &dyn Event,
    ty: EventType,
    max_depth: usize,
) -> Option<&dyn Event> {
    let mut current = Some(event);
    for _ in 0..max_depth {
        let ev = current?;
        if ev.event_type() == ty {
            return Some(ev);
        }
        current = ev.parent();
    }
    None
}
