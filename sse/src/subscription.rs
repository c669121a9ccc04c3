use crate::connection::{Subscriber, SubscriptionId, SubscriptionRegistry};
use async_stream::stream;
use events::{CustomerId, OrderEvent, RestaurantId};
use futures::Stream;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One open order stream: its registry entry plus the receiving half of its
/// private delivery channel.
///
/// Cleanup (unregister, then close the channel) runs exactly once, either via
/// [`Subscription::close`], when the governing token is cancelled while
/// waiting in [`Subscription::recv_until`], or on drop.
pub struct Subscription {
    id: SubscriptionId,
    restaurant_id: RestaurantId,
    registry: Arc<SubscriptionRegistry>,
    receiver: mpsc::Receiver<OrderEvent>,
    closed: bool,
}

impl Subscription {
    pub(crate) fn open(
        registry: Arc<SubscriptionRegistry>,
        restaurant_id: RestaurantId,
        viewer_id: Option<CustomerId>,
        channel_capacity: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(channel_capacity);

        let id = registry.register(Subscriber {
            restaurant_id: restaurant_id.clone(),
            viewer_id,
            sender,
        });
        info!(
            "Opened order subscription {} for restaurant {}",
            id.as_str(),
            restaurant_id
        );

        Self {
            id,
            restaurant_id,
            registry,
            receiver,
            closed: false,
        }
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn restaurant_id(&self) -> &RestaurantId {
        &self.restaurant_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Waits for the next event. Returns `None` once the subscription is closed.
    pub async fn recv(&mut self) -> Option<OrderEvent> {
        if self.closed {
            return None;
        }
        self.receiver.recv().await
    }

    /// Returns the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<OrderEvent> {
        if self.closed {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Waits for the next event or for `ctx` to be cancelled, whichever comes
    /// first. Cancellation closes the subscription and returns `None`.
    pub async fn recv_until(&mut self, ctx: &CancellationToken) -> Option<OrderEvent> {
        if self.closed {
            return None;
        }

        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                debug!("Governing context cancelled for subscription {}", self.id.as_str());
                self.close();
                None
            }
            event = self.receiver.recv() => event,
        }
    }

    /// Unregisters the subscription and then closes its delivery channel.
    /// Safe to call any number of times.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        // Unregister strictly before closing: once the registry no longer hands
        // out our sender, nothing new is routed to a channel that is shutting down.
        self.registry.unregister(&self.id);
        self.receiver.close();

        info!(
            "Closed order subscription {} for restaurant {}",
            self.id.as_str(),
            self.restaurant_id
        );
    }

    /// Turns the subscription into a lazy, non-restartable stream that ends
    /// when `ctx` is cancelled. Dropping the stream early also cleans up.
    pub fn into_stream(self, ctx: CancellationToken) -> impl Stream<Item = OrderEvent> + Send + 'static {
        stream! {
            let mut subscription = self;

            while let Some(event) = subscription.recv_until(&ctx).await {
                yield event;
            }

            subscription.close();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::{OrderId, OrderItems, OrderStatus};
    use futures::StreamExt;
    use std::time::Duration;

    fn order(id: i64, restaurant: &str) -> OrderEvent {
        OrderEvent::build(
            OrderId(id),
            None,
            RestaurantId::new(restaurant),
            OrderStatus::Placed,
            OrderItems::new(),
        )
    }

    fn deliver(registry: &SubscriptionRegistry, event: &OrderEvent) {
        registry.for_each_matching(event.restaurant_id(), |_, subscriber| {
            let _ = subscriber.sender.try_send(event.clone());
        });
    }

    #[tokio::test]
    async fn open_registers_and_close_unregisters() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let mut subscription =
            Subscription::open(registry.clone(), RestaurantId::new("R1"), None, 4);

        assert_eq!(registry.subscriber_count(&RestaurantId::new("R1")), 1);

        subscription.close();

        assert!(subscription.is_closed());
        assert!(registry.is_empty());
        assert_eq!(subscription.recv().await, None);
    }

    #[tokio::test]
    async fn close_twice_is_the_same_as_once() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let mut subscription =
            Subscription::open(registry.clone(), RestaurantId::new("R1"), None, 4);
        let _other = Subscription::open(registry.clone(), RestaurantId::new("R1"), None, 4);

        subscription.close();
        subscription.close();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.subscriber_count(&RestaurantId::new("R1")), 1);
    }

    #[tokio::test]
    async fn drop_unregisters() {
        let registry = Arc::new(SubscriptionRegistry::new());
        {
            let _subscription =
                Subscription::open(registry.clone(), RestaurantId::new("R1"), None, 4);
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn recv_until_returns_events_then_none_on_cancel() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let ctx = CancellationToken::new();
        let mut subscription =
            Subscription::open(registry.clone(), RestaurantId::new("R1"), None, 4);

        deliver(&registry, &order(1, "R1"));
        assert_eq!(subscription.recv_until(&ctx).await, Some(order(1, "R1")));

        ctx.cancel();
        assert_eq!(subscription.recv_until(&ctx).await, None);
        assert!(subscription.is_closed());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn recv_until_wakes_a_parked_consumer_on_cancel() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let ctx = CancellationToken::new();
        let mut subscription =
            Subscription::open(registry.clone(), RestaurantId::new("R1"), None, 4);

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let next = tokio::time::timeout(Duration::from_secs(5), subscription.recv_until(&ctx))
            .await
            .expect("cancellation should wake the consumer");
        assert_eq!(next, None);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn into_stream_ends_when_context_is_cancelled() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let ctx = CancellationToken::new();
        let subscription = Subscription::open(registry.clone(), RestaurantId::new("R1"), None, 4);
        let stream = subscription.into_stream(ctx.clone());
        futures::pin_mut!(stream);

        deliver(&registry, &order(1, "R1"));
        assert_eq!(stream.next().await, Some(order(1, "R1")));

        ctx.cancel();
        assert_eq!(stream.next().await, None);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn dropping_the_stream_unregisters() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let subscription = Subscription::open(registry.clone(), RestaurantId::new("R1"), None, 4);
        let stream = subscription.into_stream(CancellationToken::new());
        assert_eq!(registry.len(), 1);

        drop(stream);
        assert!(registry.is_empty());
    }
}
