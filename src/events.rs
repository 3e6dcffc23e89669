//! Domain event publishing over NATS.

use tracing::{debug, warn};

use crate::domain::events::DomainEvent;

/// Publishes domain events when a NATS client is configured; otherwise the
/// events are only logged. Failures never reach the caller.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    pub fn disabled() -> Self { Self::default() }

    pub async fn connect(url: &str) -> Self {
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(url, "connected to NATS");
                Self::new(Some(client))
            }
            Err(err) => {
                warn!(url, error = %err, "NATS unavailable, domain events will only be logged");
                Self::disabled()
            }
        }
    }

    pub async fn publish(&self, event: DomainEvent) {
        let subject = event.subject();
        let Some(client) = &self.nats else {
            debug!(%subject, ?event, "domain event");
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(err) => {
                warn!(%subject, error = %err, "failed to encode domain event");
                return;
            }
        };
        if let Err(err) = client.publish(subject.clone(), payload.into()).await {
            warn!(%subject, error = %err, "failed to publish domain event");
        }
    }
}
