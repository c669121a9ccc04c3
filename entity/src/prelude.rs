pub use super::food_providers::Entity as FoodProviders;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::permissions::Entity as Permissions;
pub use super::restaurants::Entity as Restaurants;
pub use super::users::Entity as Users;
