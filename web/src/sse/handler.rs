use crate::Error;
use axum::http::{header, HeaderValue};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use domain::{order as OrderApi, CustomerId, OrderEvent};
use futures::{future, StreamExt};
use log::*;
use service::AppState;
use ::sse::message::Frame;
use std::convert::Infallible;
use std::time::Duration;

const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream; charset=utf-8";

/// Opens a live order stream for `restaurant_id` and serves it as
/// Server-Sent Events.
///
/// The stream is governed by a child of the server's shutdown token, so it
/// ends on shutdown; a client disconnect drops the response body, which ends
/// the subscription too.
pub(crate) fn orders_stream(
    app_state: &AppState,
    restaurant_id: &str,
    viewer_id: Option<CustomerId>,
) -> Result<Response, Error> {
    let ctx = app_state.shutdown.child_token();
    let orders = OrderApi::orders_stream(&app_state.sse_manager, restaurant_id, viewer_id, ctx)?;

    debug!("Streaming orders of restaurant {restaurant_id} (viewer {viewer_id:?})");

    let events = orders.filter_map(|order| future::ready(encode(&order)));

    let keep_alive =
        KeepAlive::new().interval(Duration::from_secs(app_state.config.sse_keep_alive_secs));

    let mut response = Sse::new(events).keep_alive(keep_alive).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(EVENT_STREAM_CONTENT_TYPE),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

    Ok(response)
}

// An order that cannot be encoded is skipped; the stream itself never fails.
fn encode(order: &OrderEvent) -> Option<Result<Event, Infallible>> {
    match Frame::encode(order) {
        Ok(frame) => Some(Ok(frame.into())),
        Err(e) => {
            warn!("Failed to encode order {} for streaming: {e}", order.id());
            None
        }
    }
}
