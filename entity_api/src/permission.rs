use super::error::Error;
use entity::{permissions::*, Id};
use sea_orm::{entity::prelude::*, DatabaseConnection};

use log::*;

/// Finds the permission a food provider holds at a restaurant.
pub async fn find_by_food_provider_and_restaurant(
    db: &DatabaseConnection,
    food_provider_id: Id,
    restaurant_id: Uuid,
) -> Result<Model, Error> {
    debug!("Looking up permission of food provider {food_provider_id} at restaurant {restaurant_id}");

    Entity::find_by_id((food_provider_id, restaurant_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}
