//! Order events and the identifier types they carry.
//!
//! Every identifier is its own newtype so a restaurant id can never be handed
//! to an API expecting a customer id (or the reverse). `RestaurantId` is the
//! routing key for order fan-out and is compared as an opaque string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Quantity of a single menu item requested in an order.
pub type Quantity = i64;

/// Menu item identifier to requested quantity.
pub type OrderItems = BTreeMap<MenuItemId, Quantity>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodProviderId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(pub i64);

/// Opaque routing key identifying a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantId(String);

/// Returned by [`RestaurantId::parse`] when the input is not a hyphenated UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRestaurantId(pub String);

impl fmt::Display for InvalidRestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid restaurant id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidRestaurantId {}

impl RestaurantId {
    /// Wraps any string without validation. Boundary code should use [`RestaurantId::parse`].
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validates the fixed textual format (hyphenated UUID) and normalizes it to lowercase.
    pub fn parse(id: &str) -> Result<Self, InvalidRestaurantId> {
        // 36 chars rules out the simple, braced and urn forms uuid would also accept
        if id.len() != 36 {
            return Err(InvalidRestaurantId(id.to_owned()));
        }
        uuid::Uuid::parse_str(id)
            .map(|uuid| Self(uuid.hyphenated().to_string()))
            .map_err(|_| InvalidRestaurantId(id.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! display_inner {
    ($($id:ty),*) => {
        $(impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_inner!(OrderId, CustomerId, FoodProviderId, MenuItemId);

/// Lifecycle status of an order as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Placed,
    Accepted,
    Preparing,
    Ready,
    Closed,
}

/// Immutable notification describing a newly committed order.
///
/// Only ever built after the order's transaction has committed, so a viewer is
/// never told about an order that a rollback later erases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    id: OrderId,
    customer_id: Option<CustomerId>,
    restaurant_id: RestaurantId,
    status: OrderStatus,
    items: OrderItems,
}

impl OrderEvent {
    pub fn build(
        id: OrderId,
        customer_id: Option<CustomerId>,
        restaurant_id: RestaurantId,
        status: OrderStatus,
        items: OrderItems,
    ) -> Self {
        Self {
            id,
            customer_id,
            restaurant_id,
            status,
            items,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn restaurant_id(&self) -> &RestaurantId {
        &self.restaurant_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &OrderItems {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn restaurant_id_parse_accepts_hyphenated_uuid() {
        let id = RestaurantId::parse("00E1630A-8C56-47F8-8DBC-56E17953941C").unwrap();
        assert_eq!(id.as_str(), "00e1630a-8c56-47f8-8dbc-56e17953941c");
    }

    #[test]
    fn restaurant_id_parse_rejects_malformed_input() {
        for bad in [
            "",
            "R1",
            "42",
            "00e1630a8c5647f88dbc56e17953941c",
            "{00e1630a-8c56-47f8-8dbc-56e17953941c}",
            "00e1630a-8c56-47f8-8dbc-56e17953941z",
        ] {
            assert_eq!(
                RestaurantId::parse(bad),
                Err(InvalidRestaurantId(bad.to_owned())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn restaurant_id_new_is_opaque() {
        assert_eq!(RestaurantId::new("R1"), RestaurantId::new("R1"));
        assert_ne!(RestaurantId::new("R1"), RestaurantId::new("r1"));
    }

    #[test]
    fn order_event_serializes_items_as_an_object() {
        let event = OrderEvent::build(
            OrderId(7),
            Some(CustomerId(77)),
            RestaurantId::new("R1"),
            OrderStatus::Placed,
            BTreeMap::from([(MenuItemId(42), 2), (MenuItemId(3), 1)]),
        );

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "customer_id": 77,
                "restaurant_id": "R1",
                "status": "placed",
                "items": {"3": 1, "42": 2}
            })
        );

        let parsed: OrderEvent = serde_json::from_str(&value.to_string()).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn order_event_without_customer_serializes_null() {
        let event = OrderEvent::build(
            OrderId(1),
            None,
            RestaurantId::new("R2"),
            OrderStatus::Ready,
            OrderItems::new(),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["customer_id"], serde_json::Value::Null);
        assert_eq!(value["status"], "ready");
    }
}
