use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by fanning order events out to live order streams.
///
/// The domain layer decides when an order is committed and emits the event;
/// this handler only routes it to the subscriptions of the order's restaurant.
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::OrderCreated(order) => {
                debug!(
                    "Handling OrderCreated event for order {} at restaurant {}",
                    order.id(),
                    order.restaurant_id()
                );

                self.sse_manager.publish(order);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::{CustomerId, EventPublisher, MenuItemId, OrderEvent, OrderId, OrderStatus, RestaurantId};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn order_created_reaches_subscriptions_through_the_publisher() {
        let manager = Arc::new(Manager::new());
        let publisher =
            EventPublisher::new().with_handler(Arc::new(SseDomainEventHandler::new(manager.clone())));
        let mut subscription = manager.subscribe(RestaurantId::new("R1"), None);

        let order = OrderEvent::build(
            OrderId(3),
            Some(CustomerId(5)),
            RestaurantId::new("R1"),
            OrderStatus::Placed,
            BTreeMap::from([(MenuItemId(42), 2)]),
        );
        publisher
            .spawn_publish(DomainEvent::OrderCreated(order.clone()))
            .await
            .unwrap();

        assert_eq!(subscription.recv().await, Some(order));
    }
}
