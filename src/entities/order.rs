use crate::entities::user::Entity as User;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    pub status: OrderStatus,
    /// Mirrors the payment provider's own vocabulary (approved, rejected,
    /// pending, in_process, ...). Overwritten last-write-wins by the webhook,
    /// the status poll and the card-payment response.
    pub payment_status: String,
    pub total_amount: f32,
    pub payment_method: String,
    pub shipping_address: AddressSnapshot,
    #[sea_orm(unique)]
    pub payment_preference_id: Option<String>,
    pub created_at: DateTimeUtc,
}

/// Postal data frozen at checkout time. Later edits to the customer's saved
/// addresses never reach back into historical orders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AddressSnapshot {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: String,
    #[serde(default)]
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
        to = "crate::entities::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "crate::entities::order_item::Entity")]
    OrderItem,
}

impl Related<crate::entities::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<crate::entities::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fulfillment state. Orders are created as `pending`; the back office moves
/// them through novo -> producao -> enviado -> concluido, with cancelado
/// reachable from any non-terminal state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    enum_name = "order_status",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "novo")]
    Novo,
    #[sea_orm(string_value = "producao")]
    Producao,
    #[sea_orm(string_value = "enviado")]
    Enviado,
    #[sea_orm(string_value = "concluido")]
    Concluido,
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}

impl OrderStatus {
    /// Values the back office is allowed to set. `pending` is the creation
    /// state only and is not settable by hand.
    pub fn admin_settable(s: &str) -> Option<Self> {
        match Self::from_str(s) {
            Ok(Self::Pending) | Err(_) => None,
            Ok(status) => Some(status),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Concluido | Self::Cancelado)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "novo" => Ok(Self::Novo),
            "producao" => Ok(Self::Producao),
            "enviado" => Ok(Self::Enviado),
            "concluido" => Ok(Self::Concluido),
            "cancelado" => Ok(Self::Cancelado),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

impl ToString for OrderStatus {
    fn to_string(&self) -> String {
        match self {
            Self::Pending => "pending".to_string(),
            Self::Novo => "novo".to_string(),
            Self::Producao => "producao".to_string(),
            Self::Enviado => "enviado".to_string(),
            Self::Concluido => "concluido".to_string(),
            Self::Cancelado => "cancelado".to_string(),
        }
    }
}
