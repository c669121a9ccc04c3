pub mod prelude;

pub mod food_providers;
pub mod order_items;
pub mod order_status;
pub mod orders;
pub mod permissions;
pub mod restaurants;
pub mod roles;
pub mod users;

/// A type alias that represents the numeric id of users, food providers,
/// orders and menu items. Restaurants are keyed by a UUID instead.
pub type Id = i64;
