use axum::extract::{Path, Query, State};
use axum::http::{header::ACCEPT, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_food_provider::AuthenticatedFoodProvider,
    authenticated_user::AuthenticatedUser, unauthorized,
};
use crate::params::order::{CreateOrderParams, CreateUserOrderParams, IndexParams};
use crate::sse::handler as sse_handler;
use crate::{AppState, Error};
use domain::jwt::Principal;
use domain::order as OrderApi;
use log::*;

/// POST place an order at a restaurant on behalf of a customer
#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/orders",
    params(("restaurant_id" = String, Path, description = "Restaurant id (hyphenated UUID)")),
    request_body = CreateOrderParams,
    responses(
        (status = 204, description = "Order placed and announced to live order streams"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Restaurant not found"),
        (status = 422, description = "Unprocessable Entity"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedFoodProvider(food_provider_id): AuthenticatedFoodProvider,
    State(app_state): State<AppState>,
    Path(restaurant_id): Path<String>,
    Json(params): Json<CreateOrderParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST order at restaurant {restaurant_id} by food provider {food_provider_id}: {params:?}");

    let order = OrderApi::create_order(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        food_provider_id,
        &restaurant_id,
        params.customer_id,
        params.status,
        params.items,
    )
    .await?;

    debug!("Placed order {}", order.id());

    Ok(StatusCode::NO_CONTENT)
}

/// POST place an order at a restaurant as the authenticated customer
#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/user_orders",
    params(("restaurant_id" = String, Path, description = "Restaurant id (hyphenated UUID)")),
    request_body = CreateUserOrderParams,
    responses(
        (status = 204, description = "Order placed and announced to live order streams"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Restaurant not found"),
        (status = 422, description = "Unprocessable Entity"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user_order(
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(restaurant_id): Path<String>,
    Json(params): Json<CreateUserOrderParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST user order at restaurant {restaurant_id} by customer {user_id}: {params:?}");

    OrderApi::create_user_order(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        user_id,
        &restaurant_id,
        params.status,
        params.items,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET a restaurant's open orders, or a live stream of new ones
///
/// With `Accept: text/event-stream` the response is a Server-Sent Events
/// stream of orders placed from now on, one `order_created` event per order.
/// Otherwise the authenticated food provider gets the list of orders that
/// are not closed.
#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/orders",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant id (hyphenated UUID)"),
        IndexParams,
    ),
    responses(
        (status = 200, description = "Open orders, or an order event stream", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Restaurant not found"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Path(restaurant_id): Path<String>,
    Query(params): Query<IndexParams>,
    headers: HeaderMap,
    principal: Option<Extension<Principal>>,
) -> Result<Response, Error> {
    let principal = principal.map(|Extension(principal)| principal);

    if wants_event_stream(&headers) {
        let viewer_id = match principal {
            Some(Principal::User(id)) if params.exclude_own.unwrap_or(false) => Some(id),
            _ => None,
        };
        return sse_handler::orders_stream(&app_state, &restaurant_id, viewer_id);
    }

    let Some(Principal::FoodProvider(food_provider_id)) = principal else {
        return Ok(unauthorized().into_response());
    };

    debug!("GET open orders at restaurant {restaurant_id} for food provider {food_provider_id}");

    let orders =
        OrderApi::find_orders(app_state.db_conn_ref(), food_provider_id, &restaurant_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), orders)).into_response())
}

fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains("text/event-stream"))
}
