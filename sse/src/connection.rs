use dashmap::DashMap;
use events::{CustomerId, OrderEvent, RestaurantId};
use log::*;
use std::collections::HashSet;
use tokio::sync::mpsc::Sender;

/// Unique identifier for a subscription (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry entry for one open order stream.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub restaurant_id: RestaurantId,
    /// When set, orders placed by this customer are not echoed back.
    pub viewer_id: Option<CustomerId>,
    pub sender: Sender<OrderEvent>,
}

impl Subscriber {
    /// True when the event was placed by this subscriber's own viewer.
    pub fn is_own(&self, event: &OrderEvent) -> bool {
        match (self.viewer_id, event.customer_id()) {
            (Some(viewer), Some(customer)) => viewer == customer,
            _ => false,
        }
    }
}

/// Concurrent set of live subscriptions with a per-restaurant routing index.
///
/// The primary map owns the entries; the restaurant index only holds ids.
/// Entries are inserted into the primary map before the index and removed from
/// the primary map before the index, so a lookup that finds an id in the index
/// but not in the primary map is a subscription that is coming or going and is
/// skipped. No caller ever sees a half-built entry.
pub struct SubscriptionRegistry {
    /// Primary storage: lookup by subscription id for registration/cleanup - O(1)
    subscriptions: DashMap<SubscriptionId, Subscriber>,

    /// Secondary index: lookup by restaurant id for fan-out - O(1)
    restaurant_index: DashMap<RestaurantId, HashSet<SubscriptionId>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            subscriptions: DashMap::new(),
            restaurant_index: DashMap::new(),
        }
    }

    /// Register a new subscription - O(1). Visible to every publish that starts afterwards.
    pub fn register(&self, subscriber: Subscriber) -> SubscriptionId {
        let subscription_id = SubscriptionId::new();
        let restaurant_id = subscriber.restaurant_id.clone();

        self.subscriptions
            .insert(subscription_id.clone(), subscriber);

        self.restaurant_index
            .entry(restaurant_id)
            .or_default()
            .insert(subscription_id.clone());

        subscription_id
    }

    /// Unregister a subscription - O(1). Unknown or already removed ids are a no-op.
    ///
    /// Returns whether an entry was removed by this call.
    pub fn unregister(&self, subscription_id: &SubscriptionId) -> bool {
        let Some((_, subscriber)) = self.subscriptions.remove(subscription_id) else {
            trace!(
                "Subscription {} already unregistered",
                subscription_id.as_str()
            );
            return false;
        };

        let restaurant_id = subscriber.restaurant_id;
        if let Some(mut ids) = self.restaurant_index.get_mut(&restaurant_id) {
            ids.remove(subscription_id);
        }
        // A concurrent register may have refilled the set since the guard above was released
        self.restaurant_index
            .remove_if(&restaurant_id, |_, ids| ids.is_empty());

        true
    }

    /// Calls `f` for every subscription currently registered for `restaurant_id`.
    ///
    /// `f` runs with no registry lock held, so it may itself register or
    /// unregister. Subscriptions added or removed while iterating may or may not
    /// be visited.
    pub fn for_each_matching<F>(&self, restaurant_id: &RestaurantId, mut f: F)
    where
        F: FnMut(&SubscriptionId, &Subscriber),
    {
        let subscription_ids: Vec<SubscriptionId> = match self.restaurant_index.get(restaurant_id)
        {
            Some(ids) => ids.iter().cloned().collect(),
            None => return,
        };

        for subscription_id in subscription_ids {
            let subscriber = self
                .subscriptions
                .get(&subscription_id)
                .map(|entry| entry.value().clone());

            if let Some(subscriber) = subscriber {
                f(&subscription_id, &subscriber);
            }
        }
    }

    /// Number of live subscriptions for one restaurant.
    pub fn subscriber_count(&self, restaurant_id: &RestaurantId) -> usize {
        self.restaurant_index
            .get(restaurant_id)
            .map(|ids| ids.len())
            .unwrap_or(0)
    }

    /// Total number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
