use crate::error::Error;
use entity::roles::Role;
use entity_api::permission;
use events::{FoodProviderId, RestaurantId};
use log::*;
use sea_orm::{prelude::Uuid, DatabaseConnection};

/// Checks that a food provider holds at least `required` at a restaurant and
/// returns the restaurant's title.
///
/// A provider with no permission row at all gets a not-found error, one whose
/// role is too junior gets an unauthenticated error.
pub async fn check_permission(
    db: &DatabaseConnection,
    required: Role,
    food_provider_id: FoodProviderId,
    restaurant_id: &RestaurantId,
) -> Result<String, Error> {
    let restaurant_uuid = restaurant_uuid(restaurant_id)?;

    let permission =
        permission::find_by_food_provider_and_restaurant(db, food_provider_id.0, restaurant_uuid)
            .await?;

    if !permission.role.satisfies(required) {
        warn!(
            "Food provider {food_provider_id} is {} at restaurant {restaurant_id}, {required} required",
            permission.role
        );
        return Err(Error::unauthenticated());
    }

    Ok(permission.restaurant)
}

pub(crate) fn restaurant_uuid(restaurant_id: &RestaurantId) -> Result<Uuid, Error> {
    Uuid::parse_str(restaurant_id.as_str())
        .map_err(|_| events::InvalidRestaurantId(restaurant_id.to_string()).into())
}
