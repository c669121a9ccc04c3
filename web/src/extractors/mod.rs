pub(crate) mod authenticated_food_provider;
pub(crate) mod authenticated_user;

use axum::http::StatusCode;
use domain::jwt::Principal;

type RejectionType = (StatusCode, String);

pub(crate) fn unauthorized() -> RejectionType {
    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
}

/// Reads the principal the auth middleware attached to the request, if any.
pub(crate) fn principal(parts: &axum::http::request::Parts) -> Option<Principal> {
    parts.extensions.get::<Principal>().copied()
}
