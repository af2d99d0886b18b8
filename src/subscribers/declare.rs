//! # Link-time subscriber declarations (`auto-declare` feature).
//!
//! Crates submit a [`SubscriberDeclaration`] next to the subscriber they define;
//! [`SubscriptionRegistry::global`](crate::SubscriptionRegistry::global) applies all of
//! them the first time it is accessed.
//!
//! ```rust
//! use eventvisor::{Event, HandlerResult, On, SubscriberDeclaration, SubscriptionRegistry};
//!
//! struct Invoiced;
//! impl Event for Invoiced {}
//!
//! #[derive(Default)]
//! struct Ledger;
//!
//! impl Ledger {
//!     fn record(&self, _ev: &Invoiced) -> HandlerResult {
//!         Ok(())
//!     }
//! }
//!
//! fn declare_ledger(registry: &SubscriptionRegistry) {
//!     registry
//!         .subscriber::<Ledger>()
//!         .on_sync::<Invoiced>("record", On::new(), Ledger::record);
//! }
//!
//! eventvisor::inventory::submit! {
//!     SubscriberDeclaration::new("ledger", declare_ledger)
//! }
//! ```

use super::registry::SubscriptionRegistry;

/// One declaration hook, collected across every linked crate.
pub struct SubscriberDeclaration {
    /// Label used in diagnostics.
    pub name: &'static str,
    /// Adds the subscriber and its subscriptions to the registry.
    pub declare: fn(&SubscriptionRegistry),
}

impl SubscriberDeclaration {
    pub const fn new(name: &'static str, declare: fn(&SubscriptionRegistry)) -> Self {
        Self { name, declare }
    }
}

inventory::collect!(SubscriberDeclaration);

/// Applies every submitted declaration to `registry`, ordered by name.
///
/// Returns the number of declarations applied. Applying twice is harmless:
/// duplicate subscriptions are ignored by the registry.
pub fn declare_all(registry: &SubscriptionRegistry) -> usize {
    let mut declarations: Vec<&SubscriberDeclaration> =
        inventory::iter::<SubscriberDeclaration>().collect();
    declarations.sort_by_key(|d| d.name);

    for declaration in &declarations {
        tracing::debug!(name = declaration.name, "applying subscriber declaration");
        (declaration.declare)(registry);
    }
    declarations.len()
}

/// Names of all submitted declarations.
pub fn declared_subscribers() -> Vec<&'static str> {
    inventory::iter::<SubscriberDeclaration>()
        .map(|d| d.name)
        .collect()
}
