use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::public::product::PublicProductResponse;
use crate::entities::{banner, home_section, product, site_setting, EntityStatus};

/// How many products the `default` display mode shows.
const DEFAULT_HOME_PRODUCTS: u64 = 8;

pub fn home_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/home", get(get_home))
        .layer(Extension(db))
}

/// Composes the storefront homepage: logo, active banners, the main product
/// grid per the configured display mode, and the active sections.
async fn get_home(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    let settings = match load_settings(&db).await {
        Ok(map) => map,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    let display_mode = settings
        .get("home_display_mode")
        .map(|s| s.as_str())
        .unwrap_or("default")
        .to_owned();

    let mut products = match resolve_display_mode(&db, &display_mode, &settings).await {
        Ok(products) => products,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    // Empty category/custom selections fall back to the default grid.
    if products.is_empty() && display_mode != "default" {
        products = match default_products(&db).await {
            Ok(products) => products,
            Err(_) => vec![],
        };
    }

    let banners = banner::Entity::find()
        .filter(banner::Column::Status.eq(EntityStatus::Active))
        .order_by_asc(banner::Column::OrderPosition)
        .all(&*db)
        .await
        .unwrap_or_else(|_| vec![]);

    let sections = home_section::Entity::find()
        .filter(home_section::Column::Status.eq(EntityStatus::Active))
        .order_by_asc(home_section::Column::OrderPosition)
        .all(&*db)
        .await
        .unwrap_or_else(|_| vec![]);

    let mut resolved_sections = Vec::with_capacity(sections.len());
    for section in sections {
        let section_products = match resolve_section(&db, &section).await {
            Ok(products) => products,
            Err(_) => vec![],
        };
        resolved_sections.push(json!({
            "id": section.id,
            "title": section.title,
            "products": section_products
                .into_iter()
                .map(PublicProductResponse::new)
                .collect::<Vec<_>>(),
        }));
    }

    let response = json!({
        "logo": settings.get("logo_path").cloned().unwrap_or_default(),
        "display_mode": display_mode,
        "products": products
            .into_iter()
            .map(PublicProductResponse::new)
            .collect::<Vec<_>>(),
        "banners": banners,
        "sections": resolved_sections,
    });

    (StatusCode::OK, Json(response)).into_response()
}

async fn load_settings(db: &DatabaseConnection) -> Result<HashMap<String, String>, DbErr> {
    let rows = site_setting::Entity::find().all(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.setting_key, row.setting_value))
        .collect())
}

async fn resolve_display_mode(
    db: &DatabaseConnection,
    mode: &str,
    settings: &HashMap<String, String>,
) -> Result<Vec<product::Model>, DbErr> {
    match mode {
        "category" => {
            let category_id = settings
                .get("home_category_id")
                .and_then(|s| s.parse::<i32>().ok());
            match category_id {
                Some(id) => {
                    product::Entity::find()
                        .filter(product::Column::Status.eq(EntityStatus::Active))
                        .filter(product::Column::CategoryId.eq(id))
                        .order_by_desc(product::Column::CreatedAt)
                        .all(db)
                        .await
                }
                None => Ok(vec![]),
            }
        }
        "custom" => {
            let ids: Vec<i32> = settings
                .get("home_product_ids")
                .map(|s| {
                    s.split(',')
                        .filter_map(|part| part.trim().parse::<i32>().ok())
                        .collect()
                })
                .unwrap_or_default();
            if ids.is_empty() {
                return Ok(vec![]);
            }
            let found = product::Entity::find()
                .filter(product::Column::Status.eq(EntityStatus::Active))
                .filter(product::Column::Id.is_in(ids.clone()))
                .all(db)
                .await?;
            Ok(order_by_id_list(found, &ids))
        }
        _ => default_products(db).await,
    }
}

async fn default_products(db: &DatabaseConnection) -> Result<Vec<product::Model>, DbErr> {
    product::Entity::find()
        .filter(product::Column::Status.eq(EntityStatus::Active))
        .order_by_desc(product::Column::CreatedAt)
        .limit(DEFAULT_HOME_PRODUCTS)
        .all(db)
        .await
}

async fn resolve_section(
    db: &DatabaseConnection,
    section: &home_section::Model,
) -> Result<Vec<product::Model>, DbErr> {
    if let Some(category_id) = section.category_id {
        return product::Entity::find()
            .filter(product::Column::Status.eq(EntityStatus::Active))
            .filter(product::Column::CategoryId.eq(category_id))
            .order_by_desc(product::Column::CreatedAt)
            .all(db)
            .await;
    }
    let ids = &section.product_ids.0;
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let found = product::Entity::find()
        .filter(product::Column::Status.eq(EntityStatus::Active))
        .filter(product::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?;
    Ok(order_by_id_list(found, ids))
}

/// Keeps the admin-chosen ordering of an explicit id list.
fn order_by_id_list(mut products: Vec<product::Model>, ids: &[i32]) -> Vec<product::Model> {
    products.sort_by_key(|prod| ids.iter().position(|id| *id == prod.id).unwrap_or(usize::MAX));
    products
}
