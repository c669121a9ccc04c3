use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub use entity::{
    food_providers, order_items, order_status, orders, permissions, restaurants, roles, users, Id,
};

pub mod error;
pub mod order;
pub mod permission;

/// Ids of the rows created by [`seed_database`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeededIds {
    pub user_id: Id,
    pub food_provider_id: Id,
    pub restaurant_id: sea_orm::prelude::Uuid,
}

/// Inserts one restaurant, a customer and a food provider who owns the
/// restaurant. Meant for development databases.
pub async fn seed_database(db: &DatabaseConnection) -> Result<SeededIds, error::Error> {
    let customer = users::ActiveModel {
        fullname: Set("Shafin Hasnat".to_owned()),
        phone: Set("01711000000".to_owned()),
        email: Set(Some("customer@ovto.test".to_owned())),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let owner = food_providers::ActiveModel {
        fullname: Set("Taufiq Rahman".to_owned()),
        phone: Set("01767586098".to_owned()),
        email: Set(Some("owner@whitecanary.test".to_owned())),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let restaurant = restaurants::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        title: Set("White Canary".to_owned()),
        about: Set("Pancakes, all day".to_owned()),
        phone: Set("01767586098".to_owned()),
        location: Set("House #50, Road #89".to_owned()),
        city: Set("Dhaka".to_owned()),
        area: Set("Gulshan".to_owned()),
        country: Set("Bangladesh".to_owned()),
        open_time: Set("8AM".to_owned()),
        close_time: Set("11PM".to_owned()),
    }
    .insert(db)
    .await?;

    permissions::ActiveModel {
        id: Set(owner.id),
        restaurant_id: Set(restaurant.id),
        restaurant: Set(restaurant.title.clone()),
        role: Set(roles::Role::Owner),
    }
    .insert(db)
    .await?;

    Ok(SeededIds {
        user_id: customer.id,
        food_provider_id: owner.id,
        restaurant_id: restaurant.id,
    })
}
