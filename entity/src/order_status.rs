use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle stage of an order, stored as its numeric code.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Serialize,
    DeriveActiveEnum,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum OrderStatus {
    #[sea_orm(num_value = 1)]
    #[default]
    Placed,
    #[sea_orm(num_value = 2)]
    Accepted,
    #[sea_orm(num_value = 3)]
    Preparing,
    #[sea_orm(num_value = 4)]
    Ready,
    #[sea_orm(num_value = 5)]
    Closed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placed => write!(fmt, "placed"),
            Self::Accepted => write!(fmt, "accepted"),
            Self::Preparing => write!(fmt, "preparing"),
            Self::Ready => write!(fmt, "ready"),
            Self::Closed => write!(fmt, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_the_stored_values() {
        assert_eq!(OrderStatus::Placed.to_value(), 1);
        assert_eq!(OrderStatus::Closed.to_value(), 5);
        assert_eq!(OrderStatus::try_from_value(&3).unwrap(), OrderStatus::Preparing);
        assert!(OrderStatus::try_from_value(&9).is_err());
    }
}
