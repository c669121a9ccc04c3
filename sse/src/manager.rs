use crate::connection::SubscriptionRegistry;
use crate::subscription::Subscription;
use events::{CustomerId, OrderEvent, RestaurantId};
use futures::Stream;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Per-subscription buffer used when no capacity is configured.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

pub struct Manager {
    registry: Arc<SubscriptionRegistry>,
    channel_capacity: usize,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_channel_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a manager whose subscriptions buffer up to `channel_capacity`
    /// undelivered events before new ones are dropped. Zero is raised to one.
    pub fn with_channel_capacity(channel_capacity: usize) -> Self {
        Self {
            registry: Arc::new(SubscriptionRegistry::new()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Register a new subscription for `restaurant_id`.
    ///
    /// With a `viewer_id`, orders placed by that customer are not delivered to it.
    pub fn subscribe(
        &self,
        restaurant_id: RestaurantId,
        viewer_id: Option<CustomerId>,
    ) -> Subscription {
        Subscription::open(
            self.registry.clone(),
            restaurant_id,
            viewer_id,
            self.channel_capacity,
        )
    }

    /// Register a new subscription and return it as a stream governed by `ctx`.
    pub fn open(
        &self,
        restaurant_id: RestaurantId,
        viewer_id: Option<CustomerId>,
        ctx: CancellationToken,
    ) -> impl Stream<Item = OrderEvent> + Send + 'static {
        self.subscribe(restaurant_id, viewer_id).into_stream(ctx)
    }

    /// Fan an order out to every subscription of its restaurant.
    ///
    /// Never waits on a consumer: a full channel drops the event for that
    /// subscription only, and a channel closed mid-publish is skipped.
    pub fn publish(&self, event: &OrderEvent) {
        let mut delivered = 0usize;

        self.registry
            .for_each_matching(event.restaurant_id(), |subscription_id, subscriber| {
                if subscriber.is_own(event) {
                    trace!(
                        "Skipping order {} for subscription {}: placed by its viewer",
                        event.id(),
                        subscription_id.as_str()
                    );
                    return;
                }

                match subscriber.sender.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => warn!(
                        "Delivery channel full for subscription {}, dropping order {}",
                        subscription_id.as_str(),
                        event.id()
                    ),
                    Err(TrySendError::Closed(_)) => debug!(
                        "Subscription {} closed before order {} was delivered",
                        subscription_id.as_str(),
                        event.id()
                    ),
                }
            });

        debug!(
            "Published order {} to {} subscriber(s) of restaurant {}",
            event.id(),
            delivered,
            event.restaurant_id()
        );
    }

    pub fn subscriber_count(&self, restaurant_id: &RestaurantId) -> usize {
        self.registry.subscriber_count(restaurant_id)
    }

    pub fn subscription_count(&self) -> usize {
        self.registry.len()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
