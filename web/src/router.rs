use crate::{
    controller::{health_check_controller, order_controller},
    middleware::auth::authenticate,
    params, AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "ovto API"
        ),
        paths(
            health_check_controller::health_check,
            order_controller::create,
            order_controller::create_user_order,
            order_controller::index,
        ),
        components(
            schemas(
                params::order::CreateOrderParams,
                params::order::CreateUserOrderParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "ovto", description = "Restaurant ordering API with live order streams")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Bearer tokens are issued per customer or food provider.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(order_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn order_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/restaurants/:restaurant_id/orders",
            post(order_controller::create).get(order_controller::index),
        )
        .route(
            "/restaurants/:restaurant_id/user_orders",
            post(order_controller::create_user_order),
        )
        .route_layer(from_fn_with_state(app_state.clone(), authenticate))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use clap::Parser;
    use domain::jwt::{issue_token, Principal};
    use domain::{CustomerId, FoodProviderId, MenuItemId, OrderEvent, OrderId, OrderStatus, RestaurantId};
    use futures::StreamExt;
    use sea_orm::DatabaseConnection;
    use service::config::Config;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const RESTAURANT: &str = "6f1d5e36-0c39-4b0a-9f5c-3a57b2a2b0e1";

    fn app_state() -> AppState {
        let config = Config::parse_from(["ovto"]).set_token_signing_key("test-key".to_owned());
        AppState::new(config, &Arc::new(DatabaseConnection::Disconnected))
    }

    fn bearer(app_state: &AppState, principal: Principal) -> String {
        let token = issue_token(&app_state.config, principal).unwrap();
        format!("Bearer {}", token.token)
    }

    fn order(id: i64, customer: i64) -> OrderEvent {
        OrderEvent::build(
            OrderId(id),
            Some(CustomerId(customer)),
            RestaurantId::parse(RESTAURANT).unwrap(),
            OrderStatus::Placed,
            BTreeMap::from([(MenuItemId(42), 2)]),
        )
    }

    fn stream_request(uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .uri(uri)
            .header(header::ACCEPT, "text/event-stream")
    }

    async fn wait_for_subscribers(app_state: &AppState, count: usize) {
        for _ in 0..100 {
            if app_state.sse_manager.subscription_count() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {count} open order streams");
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let response = define_routes(app_state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"healthy");
    }

    #[tokio::test]
    async fn placing_an_order_requires_a_food_provider() {
        let app_state = app_state();
        let customer = bearer(&app_state, Principal::User(CustomerId(1)));

        for authorization in [None, Some(customer)] {
            let mut request = Request::builder()
                .method("POST")
                .uri(format!("/restaurants/{RESTAURANT}/orders"))
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(authorization) = authorization {
                request = request.header(header::AUTHORIZATION, authorization);
            }
            let request = request
                .body(Body::from(r#"{"customer_id": 1, "items": {"42": 2}}"#))
                .unwrap();

            let response = define_routes(app_state.clone()).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn placing_a_user_order_rejects_food_provider_tokens() {
        let app_state = app_state();
        let request = Request::builder()
            .method("POST")
            .uri(format!("/restaurants/{RESTAURANT}/user_orders"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                bearer(&app_state, Principal::FoodProvider(FoodProviderId(3))),
            )
            .body(Body::from(r#"{"items": {"42": 2}}"#))
            .unwrap();

        let response = define_routes(app_state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn customer_order_asking_to_be_closed_is_unprocessable() {
        let app_state = app_state();
        let mut subscription = app_state
            .sse_manager
            .subscribe(RestaurantId::parse(RESTAURANT).unwrap(), None);
        let request = Request::builder()
            .method("POST")
            .uri(format!("/restaurants/{RESTAURANT}/user_orders"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                bearer(&app_state, Principal::User(CustomerId(77))),
            )
            .body(Body::from(r#"{"status": "closed", "items": {"1": 1}}"#))
            .unwrap();

        let response = define_routes(app_state.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn an_invalid_bearer_token_is_rejected_even_on_the_stream() {
        let request = stream_request(&format!("/restaurants/{RESTAURANT}/orders"))
            .header(header::AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();

        let response = define_routes(app_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_orders_without_a_token_is_unauthorized() {
        let request = Request::builder()
            .uri(format!("/restaurants/{RESTAURANT}/orders"))
            .body(Body::empty())
            .unwrap();

        let response = define_routes(app_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_restaurant_id_on_the_stream_is_not_found() {
        let app_state = app_state();
        let request = stream_request("/restaurants/R1/orders")
            .body(Body::empty())
            .unwrap();

        let response = define_routes(app_state.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(app_state.sse_manager.subscription_count(), 0);
    }

    #[tokio::test]
    async fn stream_delivers_order_created_frames() {
        let app_state = app_state();
        let request = stream_request(&format!("/restaurants/{RESTAURANT}/orders"))
            .body(Body::empty())
            .unwrap();

        let response = define_routes(app_state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream; charset=utf-8"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        wait_for_subscribers(&app_state, 1).await;
        app_state.sse_manager.publish(&order(12, 77));

        let mut body = response.into_body().into_data_stream();
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("a frame should arrive")
            .unwrap()
            .unwrap();
        let frame = String::from_utf8(chunk.to_vec()).unwrap();

        assert!(frame.starts_with("event: order_created\n"), "{frame}");
        assert!(frame.contains(r#""id":12"#), "{frame}");
        assert!(frame.ends_with("\n\n"), "{frame}");
    }

    #[tokio::test]
    async fn customer_can_exclude_their_own_orders_from_the_stream() {
        let app_state = app_state();
        let request = stream_request(&format!(
            "/restaurants/{RESTAURANT}/orders?exclude_own=true"
        ))
        .header(
            header::AUTHORIZATION,
            bearer(&app_state, Principal::User(CustomerId(77))),
        )
        .body(Body::empty())
        .unwrap();

        let response = define_routes(app_state.clone()).oneshot(request).await.unwrap();
        wait_for_subscribers(&app_state, 1).await;

        app_state.sse_manager.publish(&order(1, 77));
        app_state.sse_manager.publish(&order(2, 78));

        let mut body = response.into_body().into_data_stream();
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("a frame should arrive")
            .unwrap()
            .unwrap();
        let frame = String::from_utf8(chunk.to_vec()).unwrap();

        assert!(frame.contains(r#""id":2"#), "{frame}");
    }

    #[tokio::test]
    async fn shutdown_ends_open_streams() {
        let app_state = app_state();
        let request = stream_request(&format!("/restaurants/{RESTAURANT}/orders"))
            .body(Body::empty())
            .unwrap();

        let response = define_routes(app_state.clone()).oneshot(request).await.unwrap();
        wait_for_subscribers(&app_state, 1).await;

        app_state.shutdown.cancel();

        let mut body = response.into_body().into_data_stream();
        let end = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("the stream should end");
        assert!(end.is_none());
        assert_eq!(app_state.sse_manager.subscription_count(), 0);
    }

    #[tokio::test]
    async fn dropping_the_response_closes_the_subscription() {
        let app_state = app_state();
        let request = stream_request(&format!("/restaurants/{RESTAURANT}/orders"))
            .body(Body::empty())
            .unwrap();

        let response = define_routes(app_state.clone()).oneshot(request).await.unwrap();
        wait_for_subscribers(&app_state, 1).await;

        drop(response);

        assert_eq!(app_state.sse_manager.subscription_count(), 0);
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use clap::Parser;
    use domain::jwt::{issue_token, Principal};
    use domain::{order_status::OrderStatus as StoredStatus, roles::Role, FoodProviderId};
    use domain::{orders, permissions};
    use futures::StreamExt;
    use sea_orm::{prelude::Uuid, DatabaseBackend, MockDatabase, MockExecResult};
    use service::config::Config;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const RESTAURANT: &str = "6f1d5e36-0c39-4b0a-9f5c-3a57b2a2b0e1";

    #[tokio::test]
    async fn staff_order_is_streamed_to_an_open_viewer() {
        let restaurant_id = Uuid::parse_str(RESTAURANT).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![permissions::Model {
                id: 3,
                restaurant_id,
                restaurant: "White Canary".to_owned(),
                role: Role::Waiter,
            }]])
            .append_query_results(vec![vec![orders::Model {
                id: 12,
                customer_id: 77,
                restaurant_id,
                status: StoredStatus::Placed,
            }]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let config = Config::parse_from(["ovto"]).set_token_signing_key("test-key".to_owned());
        let app_state = AppState::new(config, &Arc::new(db));
        let token = issue_token(&app_state.config, Principal::FoodProvider(FoodProviderId(3)))
            .unwrap()
            .token;

        let viewer = define_routes(app_state.clone())
            .oneshot(
                Request::builder()
                    .uri(format!("/restaurants/{RESTAURANT}/orders"))
                    .header(header::ACCEPT, "text/event-stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let placed = define_routes(app_state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/restaurants/{RESTAURANT}/orders"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::from(r#"{"customer_id": 77, "items": {"42": 2}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(placed.status(), StatusCode::NO_CONTENT);

        let mut body = viewer.into_body().into_data_stream();
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("the order should be streamed")
            .unwrap()
            .unwrap();
        let frame = String::from_utf8(chunk.to_vec()).unwrap();

        assert!(frame.starts_with("event: order_created\n"), "{frame}");
        assert!(frame.contains(r#""id":12"#), "{frame}");
        assert!(frame.contains(r#""items":{"42":2}"#), "{frame}");
    }
}
