//! Notification channel over the in-process event bus.

use async_trait::async_trait;
use shared_bus::{EventPublisher, MatchEvent};
use std::sync::Arc;
use tracing::trace;

use crate::ports::{NotificationChannel, NotificationError};

/// Publishes lifecycle events on a `shared-bus` publisher.
#[derive(Clone)]
pub struct BusNotifier {
    publisher: Arc<dyn EventPublisher>,
}

impl BusNotifier {
    /// Wrap a publisher.
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl NotificationChannel for BusNotifier {
    async fn notify(&self, event: MatchEvent) -> Result<usize, NotificationError> {
        let topic = event.topic();
        let receivers = self.publisher.publish(event).await;
        trace!(?topic, receivers, "Event handed to bus");
        Ok(receivers)
    }
}

/// Drops every event. For deployments without a delivery path.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl NotificationChannel for NoopNotifier {
    async fn notify(&self, _event: MatchEvent) -> Result<usize, NotificationError> {
        Ok(0)
    }
}
