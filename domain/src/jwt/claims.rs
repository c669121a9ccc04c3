//! Claims carried by the bearer tokens this service issues.

use serde::{Deserialize, Serialize};

/// Which account table `sub` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PrincipalKind {
    User,
    FoodProvider,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct BearerClaims {
    pub(crate) sub: i64,
    pub(crate) kind: PrincipalKind,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}
