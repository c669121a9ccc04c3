use domain::{CustomerId, OrderItems, OrderStatus};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Body of an order placed by a food provider on behalf of a customer.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateOrderParams {
    #[schema(value_type = i64, example = 77)]
    pub(crate) customer_id: CustomerId,
    /// Defaults to `placed`
    #[schema(value_type = Option<String>, example = "placed")]
    pub(crate) status: Option<OrderStatus>,
    /// Menu item id to quantity
    #[schema(value_type = Object)]
    pub(crate) items: OrderItems,
}

/// Body of an order placed by the authenticated customer.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateUserOrderParams {
    /// Only `placed` is accepted; defaults to `placed`
    #[schema(value_type = Option<String>, example = "placed")]
    pub(crate) status: Option<OrderStatus>,
    #[schema(value_type = Object)]
    pub(crate) items: OrderItems,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// On an event stream opened by a customer, leave out that customer's own orders
    pub(crate) exclude_own: Option<bool>,
}
