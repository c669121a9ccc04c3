use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A food provider's role at one restaurant. Lower levels carry more
/// authority; `Admin` outranks everyone.
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
pub enum Role {
    #[sea_orm(num_value = 0)]
    Admin,
    #[sea_orm(num_value = 5)]
    Owner,
    #[sea_orm(num_value = 10)]
    Manager,
    #[sea_orm(num_value = 15)]
    Supervisor,
    #[sea_orm(num_value = 20)]
    #[default]
    Waiter,
}

impl Role {
    pub fn level(&self) -> i32 {
        self.to_value()
    }

    /// True when this role is at least as privileged as `required`.
    pub fn satisfies(&self, required: Role) -> bool {
        self.level() <= required.level()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(fmt, "admin"),
            Role::Owner => write!(fmt, "owner"),
            Role::Manager => write!(fmt, "manager"),
            Role::Supervisor => write!(fmt, "supervisor"),
            Role::Waiter => write!(fmt, "waiter"),
        }
    }
}
