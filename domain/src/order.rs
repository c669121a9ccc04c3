//! Placing and listing orders, and opening live order streams.
//!
//! An order is validated, written together with its items in one
//! transaction and, only once that transaction has committed, announced to
//! live order streams through a detached publish. A failure anywhere before
//! the commit means no event is ever built.

use crate::error::Error;
use crate::permission::{check_permission, restaurant_uuid};
use entity::{order_status::OrderStatus as StoredStatus, orders, roles::Role};
use entity_api::order::{self as order_api, OrderWithItems};
use events::{
    CustomerId, DomainEvent, EventPublisher, FoodProviderId, MenuItemId, OrderEvent, OrderId,
    OrderItems, OrderStatus, RestaurantId,
};
use futures::Stream;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// A persisted, not yet closed order as returned by [`find_orders`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub status: OrderStatus,
    pub items: OrderItems,
}

/// Places an order on behalf of `customer_id` as a food provider working at
/// the restaurant. Requires at least [`Role::Waiter`].
pub async fn create_order(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    food_provider_id: FoodProviderId,
    restaurant_id: &str,
    customer_id: CustomerId,
    status: Option<OrderStatus>,
    items: OrderItems,
) -> Result<OrderEvent, Error> {
    let restaurant_id = RestaurantId::parse(restaurant_id)?;
    validate_items(&items)?;

    check_permission(db, Role::Waiter, food_provider_id, &restaurant_id).await?;

    place(db, publisher, restaurant_id, customer_id, status, items).await
}

/// Places an order as the authenticated customer `user_id`.
///
/// Customer orders always start out `placed`; asking for any other status is
/// invalid.
pub async fn create_user_order(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    user_id: CustomerId,
    restaurant_id: &str,
    status: Option<OrderStatus>,
    items: OrderItems,
) -> Result<OrderEvent, Error> {
    let restaurant_id = RestaurantId::parse(restaurant_id)?;
    validate_customer_status(status)?;
    validate_items(&items)?;

    place(db, publisher, restaurant_id, user_id, Some(OrderStatus::Placed), items).await
}

/// Lists the restaurant's orders that are not closed. Requires at least
/// [`Role::Waiter`].
pub async fn find_orders(
    db: &DatabaseConnection,
    food_provider_id: FoodProviderId,
    restaurant_id: &str,
) -> Result<Vec<Order>, Error> {
    let restaurant_id = RestaurantId::parse(restaurant_id)?;

    check_permission(db, Role::Waiter, food_provider_id, &restaurant_id).await?;

    let orders = order_api::find_open_by_restaurant(db, restaurant_uuid(&restaurant_id)?).await?;

    Ok(orders
        .into_iter()
        .map(|(order, items)| Order {
            id: OrderId(order.id),
            customer_id: CustomerId(order.customer_id),
            restaurant_id: restaurant_id.clone(),
            status: to_event_status(order.status),
            items: items
                .into_iter()
                .map(|item| (MenuItemId(item.item_id), item.quantity))
                .collect(),
        })
        .collect())
}

/// Opens a live stream of orders placed at `restaurant_id` from now on.
///
/// When `viewer_id` is set, orders placed by that customer are left out. The
/// stream ends when `ctx` is cancelled; dropping it also ends the
/// subscription. A malformed restaurant id is the only error; once the
/// stream exists nothing fails through it.
pub fn orders_stream(
    manager: &sse::Manager,
    restaurant_id: &str,
    viewer_id: Option<CustomerId>,
    ctx: CancellationToken,
) -> Result<impl Stream<Item = OrderEvent> + Send + 'static, Error> {
    let restaurant_id = RestaurantId::parse(restaurant_id)?;

    Ok(manager.open(restaurant_id, viewer_id, ctx))
}

async fn place(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    restaurant_id: RestaurantId,
    customer_id: CustomerId,
    status: Option<OrderStatus>,
    items: OrderItems,
) -> Result<OrderEvent, Error> {
    let status = status.unwrap_or_default();

    let order_model = orders::Model {
        id: 0,
        customer_id: customer_id.0,
        restaurant_id: restaurant_uuid(&restaurant_id)?,
        status: to_stored_status(status),
    };
    let rows = items.iter().map(|(item, quantity)| (item.0, *quantity)).collect();

    let (order, _): OrderWithItems = order_api::create(db, order_model, rows).await?;

    // Committed: from here on the order exists and must be announced.
    let event = OrderEvent::build(
        OrderId(order.id),
        Some(customer_id),
        restaurant_id,
        status,
        items,
    );
    debug!(
        "Publishing order {} for restaurant {}",
        event.id(),
        event.restaurant_id()
    );
    publisher.spawn_publish(DomainEvent::OrderCreated(event.clone()));

    Ok(event)
}

fn validate_customer_status(status: Option<OrderStatus>) -> Result<(), Error> {
    match status {
        None | Some(OrderStatus::Placed) => Ok(()),
        Some(status) => {
            warn!("Rejecting customer order requesting status {status:?}");
            Err(Error::invalid())
        }
    }
}

fn validate_items(items: &OrderItems) -> Result<(), Error> {
    if items.is_empty() {
        warn!("Rejecting order without items");
        return Err(Error::invalid());
    }
    if let Some((item, quantity)) = items.iter().find(|(_, quantity)| **quantity <= 0) {
        warn!("Rejecting order with quantity {quantity} for item {item}");
        return Err(Error::invalid());
    }
    Ok(())
}

fn to_stored_status(status: OrderStatus) -> StoredStatus {
    match status {
        OrderStatus::Placed => StoredStatus::Placed,
        OrderStatus::Accepted => StoredStatus::Accepted,
        OrderStatus::Preparing => StoredStatus::Preparing,
        OrderStatus::Ready => StoredStatus::Ready,
        OrderStatus::Closed => StoredStatus::Closed,
    }
}

fn to_event_status(status: StoredStatus) -> OrderStatus {
    match status {
        StoredStatus::Placed => OrderStatus::Placed,
        StoredStatus::Accepted => OrderStatus::Accepted,
        StoredStatus::Preparing => OrderStatus::Preparing,
        StoredStatus::Ready => OrderStatus::Ready,
        StoredStatus::Closed => OrderStatus::Closed,
    }
}
