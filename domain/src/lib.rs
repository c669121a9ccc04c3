//! Business operations of the order platform.
//!
//! Consumers of the `domain` crate use the re-exports below instead of
//! depending on `entity_api` or `events` directly.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{order_items, order_status, orders, permissions, roles, Id};

pub use events::{
    CustomerId, EventPublisher, FoodProviderId, MenuItemId, OrderEvent, OrderId, OrderItems,
    OrderStatus, RestaurantId,
};

pub mod error;
pub mod jwt;
pub mod order;
pub mod permission;
