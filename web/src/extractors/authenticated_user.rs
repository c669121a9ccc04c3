use crate::extractors::{principal, unauthorized, RejectionType};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::{jwt::Principal, CustomerId};

/// A request made with a valid customer bearer token.
pub(crate) struct AuthenticatedUser(pub CustomerId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // Food provider tokens are rejected just like missing ones.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal(parts) {
            Some(Principal::User(id)) => Ok(AuthenticatedUser(id)),
            _ => Err(unauthorized()),
        }
    }
}
