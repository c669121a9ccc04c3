use crate::{roles::Role, Id};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Grants one food provider a role at one restaurant. `restaurant` caches
/// the restaurant's title.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, ToSchema, Serialize, Deserialize)]
#[schema(as = entity::permissions::Model)] // OpenAPI schema
#[sea_orm(table_name = "permission")]
pub struct Model {
    /// The food provider's id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,
    #[sea_orm(primary_key, auto_increment = false)]
    #[schema(value_type = String, format = Uuid)]
    pub restaurant_id: Uuid,
    pub restaurant: String,
    pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::food_providers::Entity",
        from = "Column::Id",
        to = "super::food_providers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FoodProviders,
    #[sea_orm(
        belongs_to = "super::restaurants::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurants::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Restaurants,
}

impl Related<super::food_providers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodProviders.def()
    }
}

impl Related<super::restaurants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
