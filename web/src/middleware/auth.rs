use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::jwt;
use log::*;
use service::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves an `Authorization: Bearer` token into a [`jwt::Principal`] stored
/// in the request extensions.
///
/// Requests without a bearer token continue anonymously; the extractors
/// decide whether a handler needs one. A bearer token that fails
/// verification is answered with 401 right away.
pub async fn authenticate(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::to_owned);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match jwt::verify_token(&app_state.config, &token) {
        Ok(principal) => {
            trace!("Authenticated request as {principal:?}");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            debug!("Rejecting bearer token: {e}");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}
