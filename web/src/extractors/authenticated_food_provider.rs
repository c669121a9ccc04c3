use crate::extractors::{principal, unauthorized, RejectionType};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::{jwt::Principal, FoodProviderId};

/// A request made with a valid food provider bearer token.
pub(crate) struct AuthenticatedFoodProvider(pub FoodProviderId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedFoodProvider
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal(parts) {
            Some(Principal::FoodProvider(id)) => Ok(AuthenticatedFoodProvider(id)),
            _ => Err(unauthorized()),
        }
    }
}
