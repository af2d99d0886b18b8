//! # Listener buckets: declared per event type, resolved per dispatched type.
//!
//! ```text
//! declared (built once, never sorted):
//!   EventType ─► Bucket { serial: [L, L, ..], background: [L, ..] }   (subscriber order, then declaration order)
//!
//! resolved (first dispatch of a concrete type, cached forever):
//!   chain = [Concrete, Parent, Grandparent, ..]        (bounded by max depth)
//!   serial     = concat(declared[t].serial     for t in chain)  ─► stable sort by priority desc
//!   background = concat(declared[t].background for t in chain)  ─► stable sort by priority desc
//! ```
//!
//! The cache is keyed by the concrete `TypeId`: every value of a type must report
//! the same parent chain.

use std::any::TypeId;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::listener::Listener;
use crate::events::{ancestor_chain, Event, EventType};

/// Serial and background listeners for one event type.
#[derive(Default)]
pub(crate) struct Bucket {
    pub(crate) serial: Vec<Arc<Listener>>,
    pub(crate) background: Vec<Arc<Listener>>,
}

impl Bucket {
    fn push(&mut self, listener: Arc<Listener>) {
        if listener.is_background() {
            self.background.push(listener);
        } else {
            self.serial.push(listener);
        }
    }

    fn extend_from(&mut self, other: &Bucket) {
        self.serial.extend(other.serial.iter().cloned());
        self.background.extend(other.background.iter().cloned());
    }

    fn sort_by_priority(&mut self) {
        self.serial.sort_by_key(|l| Reverse(l.priority()));
        self.background.sort_by_key(|l| Reverse(l.priority()));
    }

    pub(crate) fn len(&self) -> usize {
        self.serial.len() + self.background.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) struct Buckets {
    declared: HashMap<EventType, Bucket>,
    resolved: RwLock<HashMap<TypeId, Arc<Bucket>>>,
    max_depth: usize,
}

impl Buckets {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            declared: HashMap::new(),
            resolved: RwLock::new(HashMap::new()),
            max_depth,
        }
    }

    /// Appends `listener` to the bucket of the event type it was declared on.
    pub(crate) fn push(&mut self, event: EventType, listener: Arc<Listener>) {
        self.declared.entry(event).or_default().push(listener);
    }

    /// Listeners declared directly on `event`.
    pub(crate) fn declared_len(&self, event: EventType) -> usize {
        self.declared.get(&event).map_or(0, Bucket::len)
    }

    /// Total number of compiled listeners.
    pub(crate) fn total(&self) -> usize {
        self.declared.values().map(Bucket::len).sum()
    }

    /// Ordered listeners for the concrete type of `event`, computed once per type.
    pub(crate) fn resolve(&self, event: &dyn Event) -> Arc<Bucket> {
        let key = event.event_type().id();
        if let Some(hit) = self
            .resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(hit);
        }

        let chain = ancestor_chain(event, self.max_depth);
        let mut bucket = Bucket::default();
        for ty in &chain {
            if let Some(declared) = self.declared.get(ty) {
                bucket.extend_from(declared);
            }
        }
        bucket.sort_by_priority();

        tracing::debug!(
            event = event.event_type().name(),
            chain = chain.len(),
            serial = bucket.serial.len(),
            background = bucket.background.len(),
            "listener bucket resolved"
        );

        let mut resolved = self
            .resolved
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(resolved.entry(key).or_insert_with(|| Arc::new(bucket)))
    }
}
