//! # Example: Conversion Tracking
//!
//! Three subscribers react to an ad-tracking event hierarchy:
//! ```text
//! ConversionEvent ─┐
//!                  ├─► ImpressionOrConversionEvent ─► TrackingEvent
//! ImpressionEvent ─┘
//! ```
//!
//! - `Slack` is declared at link time (`inventory::submit!`) and listens on the ancestors.
//! - `Billing` and `Analytics` are declared explicitly; `Analytics` is built by a custom container.
//! - Failures in `Billing` are isolated and logged through `tracing`.
//!
//! Run with: `cargo run --example dispatch`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eventvisor::{
    inventory, ContainerFn, Dispatcher, Event, HandlerError, HandlerResult, On, Propagation,
    Resolution, SubscriberDeclaration, SubscriberId, SubscriberType, SubscriptionRegistry,
};

struct TrackingEvent {
    campaign: &'static str,
    propagation: Propagation,
}

impl Event for TrackingEvent {
    fn is_propagation_stopped(&self) -> bool {
        self.propagation.is_stopped()
    }
}

struct ImpressionOrConversionEvent {
    tracking: TrackingEvent,
}

impl Event for ImpressionOrConversionEvent {
    fn parent(&self) -> Option<&dyn Event> {
        Some(&self.tracking)
    }
    fn is_propagation_stopped(&self) -> bool {
        self.tracking.is_propagation_stopped()
    }
}

struct ConversionEvent {
    inner: ImpressionOrConversionEvent,
    amount_cents: u64,
}

impl Event for ConversionEvent {
    fn parent(&self) -> Option<&dyn Event> {
        Some(&self.inner)
    }
    fn is_propagation_stopped(&self) -> bool {
        self.inner.is_propagation_stopped()
    }
}

struct ImpressionEvent {
    inner: ImpressionOrConversionEvent,
}

impl Event for ImpressionEvent {
    fn parent(&self) -> Option<&dyn Event> {
        Some(&self.inner)
    }
    fn is_propagation_stopped(&self) -> bool {
        self.inner.is_propagation_stopped()
    }
}

fn tracking(campaign: &'static str) -> ImpressionOrConversionEvent {
    ImpressionOrConversionEvent {
        tracking: TrackingEvent {
            campaign,
            propagation: Propagation::new(),
        },
    }
}

/// Posts to a chat channel; declared at link time.
#[derive(Default)]
struct Slack;

impl Slack {
    async fn notify(&self, ev: &ImpressionOrConversionEvent) -> HandlerResult {
        println!("[slack] activity on campaign {}", ev.tracking.campaign);
        Ok(())
    }

    async fn archive(&self, ev: &TrackingEvent) -> HandlerResult {
        tokio::time::sleep(Duration::from_millis(50)).await;
        println!("[slack] archived {}", ev.campaign);
        Ok(())
    }
}

fn declare_slack(registry: &SubscriptionRegistry) {
    registry
        .subscriber::<Slack>()
        .on::<ImpressionOrConversionEvent>("notify", On::new().priority(-99), |s, e| {
            Box::pin(s.notify(e))
        })
        .on::<TrackingEvent>("archive", On::new().background(), |s, e| {
            Box::pin(s.archive(e))
        });
}

inventory::submit! {
    SubscriberDeclaration::new("demo-slack", declare_slack)
}

#[derive(Default)]
struct Billing;

impl Billing {
    fn validate(&self, ev: &ConversionEvent) -> HandlerResult {
        if ev.amount_cents == 0 {
            ev.inner.tracking.propagation.stop();
            println!("[billing] empty conversion, propagation stopped");
        }
        Ok(())
    }

    fn charge(&self, ev: &ConversionEvent) -> HandlerResult {
        if ev.amount_cents > 100_000 {
            return Err(HandlerError::fail("amount over limit"));
        }
        println!("[billing] charged {} cents", ev.amount_cents);
        Ok(())
    }
}

/// Needs a constructor argument, so only the custom container can build it.
struct Analytics {
    seen: AtomicU64,
}

impl Analytics {
    fn count(&self, ev: &ImpressionEvent) -> HandlerResult {
        let n = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[analytics] impression #{n} for {}", ev.inner.tracking.campaign);
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eventvisor=debug")),
        )
        .init();

    let registry = SubscriptionRegistry::global();
    registry
        .subscriber::<Billing>()
        .on_sync::<ConversionEvent>("validate", On::new().priority(10), Billing::validate)
        .on_sync::<ConversionEvent>("charge", On::new(), Billing::charge);
    registry
        .external_subscriber::<Analytics>()
        .on_sync::<ImpressionEvent>("count", On::new(), Analytics::count);

    let analytics = Arc::new(Analytics {
        seen: AtomicU64::new(0),
    });
    let container = ContainerFn::arc(move |ty: &SubscriberType| {
        if ty.is::<Analytics>() {
            Resolution::ready(Arc::clone(&analytics))
        } else {
            Resolution::Ready(ty.construct())
        }
    });

    let dispatcher = Dispatcher::builder(registry)
        .with_subscribers([
            SubscriberId::of::<Slack>(),
            SubscriberId::of::<Billing>(),
            SubscriberId::of::<Analytics>(),
        ])
        .with_container(container)
        .build()?;

    dispatcher
        .dispatch(ImpressionEvent {
            inner: tracking("spring-sale"),
        })
        .await?;
    dispatcher
        .dispatch(ConversionEvent {
            inner: tracking("spring-sale"),
            amount_cents: 4_999,
        })
        .await?;
    dispatcher
        .dispatch(ConversionEvent {
            inner: tracking("spring-sale"),
            amount_cents: 250_000,
        })
        .await?;
    dispatcher
        .dispatch(ConversionEvent {
            inner: tracking("spring-sale"),
            amount_cents: 0,
        })
        .await?;

    println!("[main] serial phases done, waiting for background listeners");
    dispatcher.flush().await;
    println!("[main] done");
    Ok(())
}
