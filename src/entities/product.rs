use crate::entities::category::Entity as Category;
use crate::entities::EntityStatus;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f32,
    pub promo_price: Option<f32>,
    pub is_promo: bool,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub main_image: Option<String>,
    pub secondary_images: ImageList,
    pub options: OptionSchema,
    pub status: EntityStatus,
    pub created_at: DateTimeUtc,
}

/// Paths of the extra product images, stored as a JSON column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ImageList(pub Vec<String>);

/// Selectable variants offered by a product: option name to the list of
/// allowed values (e.g. "size" -> ["A4", "A3"]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OptionSchema(pub std::collections::BTreeMap<String, Vec<String>>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Category",
        from = "Column::CategoryId",
        to = "crate::entities::category::Column::Id",
        on_update = "Cascade"
    )]
    Category,
}

impl Related<crate::entities::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
