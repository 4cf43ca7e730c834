use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    product::{self, Entity as ProductEntity},
    EntityStatus,
};

pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/product", get(get_products))
        .route("/product/:id", get(get_product))
        .layer(Extension(db))
}

async fn get_products(
    Query(params): Query<GetProductsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let mut condition = Condition::all().add(product::Column::Status.eq(EntityStatus::Active));

    if let Some(category_id) = params.category {
        condition = condition.add(product::Column::CategoryId.eq(category_id));
    }

    if let Some(search) = params.search {
        condition = condition.add(
            Condition::any()
                .add(product::Column::Name.contains(&search))
                .add(product::Column::Description.contains(&search)),
        );
    }

    let page: u64 = params.page.unwrap_or(1).max(1);
    let page_size: u64 = params.page_size.unwrap_or(12).clamp(1, 100);

    let result = ProductEntity::find()
        .filter(condition)
        .order_by_desc(product::Column::CreatedAt)
        .limit(page_size)
        .offset((page - 1) * page_size)
        .all(&*db)
        .await;

    match result {
        Ok(products) => {
            let response: Vec<PublicProductResponse> = products
                .into_iter()
                .map(PublicProductResponse::new)
                .collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let result = ProductEntity::find_by_id(id)
        .filter(product::Column::Status.eq(EntityStatus::Active))
        .one(&*db)
        .await;
    match result {
        Ok(Some(prod)) => (StatusCode::OK, Json(PublicProductResponse::new(prod))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No product with {} id was found.", id)
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct GetProductsQuery {
    category: Option<i32>,
    search: Option<String>,
    page: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Serialize)]
pub struct PublicProductResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f32,
    pub promo_price: Option<f32>,
    pub is_promo: bool,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub main_image: Option<String>,
    pub secondary_images: Vec<String>,
    pub options: std::collections::BTreeMap<String, Vec<String>>,
}

impl PublicProductResponse {
    pub fn new(value: product::Model) -> PublicProductResponse {
        PublicProductResponse {
            id: value.id,
            name: value.name,
            description: value.description,
            price: value.price,
            promo_price: value.promo_price,
            is_promo: value.is_promo,
            stock: value.stock,
            category_id: value.category_id,
            main_image: value.main_image,
            secondary_images: value.secondary_images.0,
            options: value.options.0,
        }
    }
}
