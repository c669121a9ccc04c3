//! Event system infrastructure for ovto.
//!
//! This crate provides the event system that enables loose coupling between
//! order persistence and infrastructure concerns (like live SSE notifications).
//!
//! # Architecture
//!
//! - **OrderEvent**: Immutable record of a committed order, the unit of fan-out
//! - **DomainEvent**: Enum representing all business events in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies.

use async_trait::async_trait;
use log::*;
use std::sync::Arc;

pub mod order;

pub use order::{
    CustomerId, FoodProviderId, InvalidRestaurantId, MenuItemId, OrderEvent, OrderId, OrderItems,
    OrderStatus, Quantity, RestaurantId,
};

/// Domain events that represent business-level changes in the system.
/// These events are emitted only after the change has been durably committed.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// Emitted once per order, after the order row and its items are committed.
    /// Routed to every live stream subscribed to the order's restaurant.
    OrderCreated(OrderEvent),
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::OrderCreated(_) => "order_created",
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    /// Publish from a detached task so the caller (typically a request handler
    /// that just committed a transaction) does not wait on fan-out.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_publish(&self, event: DomainEvent) -> tokio::task::JoinHandle<()> {
        let publisher = self.clone();
        trace!("Spawning detached publish of {}", event.name());
        tokio::spawn(async move { publisher.publish(event).await })
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
