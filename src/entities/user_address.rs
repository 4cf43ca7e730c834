use crate::entities::user::Entity as User;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Saved postal address. At most one default per user per kind; the write
/// path clears the flag on the siblings, the schema does not enforce it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "user_addresses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    pub kind: AddressKind,
    pub is_default: bool,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "Column::UserId",
        to = "crate::entities::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<crate::entities::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    enum_name = "address_kind",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
pub enum AddressKind {
    #[sea_orm(string_value = "shipping")]
    #[serde(rename = "shipping")]
    Shipping,
    #[sea_orm(string_value = "billing")]
    #[serde(rename = "billing")]
    Billing,
}

impl FromStr for AddressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shipping" => Ok(Self::Shipping),
            "billing" => Ok(Self::Billing),
            _ => Err(format!("Invalid address kind: {}", s)),
        }
    }
}

impl ToString for AddressKind {
    fn to_string(&self) -> String {
        match self {
            Self::Shipping => "shipping".to_string(),
            Self::Billing => "billing".to_string(),
        }
    }
}
