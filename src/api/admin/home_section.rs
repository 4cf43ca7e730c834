use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    category,
    home_section::{self, Entity as HomeSectionEntity, ProductIdList},
    EntityStatus,
};

//ROUTERS
pub fn admin_home_section_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/home-section", get(get_sections).post(create_section))
        .route(
            "/home-section/:id",
            axum::routing::patch(patch_section).delete(delete_section),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_sections(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    let result = HomeSectionEntity::find()
        .order_by_asc(home_section::Column::OrderPosition)
        .all(&*db)
        .await;

    match result {
        Ok(sections) => (StatusCode::OK, Json(sections)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

/// A section pulls products either from one category or from an explicit
/// ordered id list, not both.
async fn create_section(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateSection>,
) -> impl IntoResponse {
    if payload.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Title must not be empty"
            })),
        );
    }

    let product_ids = payload.product_ids.unwrap_or_default();
    if payload.category_id.is_some() && !product_ids.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Section selects by category or by product list, not both"
            })),
        );
    }

    if let Some(category_id) = payload.category_id {
        match category::Entity::find_by_id(category_id).one(&*db).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": format!("No category with {} id was found", category_id)
                    })),
                );
            }
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                );
            }
        }
    }

    let new_section = home_section::ActiveModel {
        title: Set(payload.title),
        category_id: Set(payload.category_id),
        product_ids: Set(ProductIdList(product_ids)),
        order_position: Set(payload.order_position.unwrap_or(0)),
        status: Set(EntityStatus::Active),
        ..Default::default()
    };

    match HomeSectionEntity::insert(new_section).exec(&*db).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Section created successfully",
                "id": result.last_insert_id,
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

async fn patch_section(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchSection>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    match HomeSectionEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            let mut model: home_section::ActiveModel = model.into();

            if let Some(title) = payload.title {
                model.title = Set(title);
            }
            if let Some(category_id) = payload.category_id {
                model.category_id = Set(category_id);
            }
            if let Some(product_ids) = payload.product_ids {
                model.product_ids = Set(ProductIdList(product_ids));
            }
            if let Some(order_position) = payload.order_position {
                model.order_position = Set(order_position);
            }
            if let Some(status) = payload.status {
                model.status = Set(status);
            }

            match model.update(&txn).await {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully."
                        })),
                    )
                }
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Failed to patch this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No section with {} id was found.", id)
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        ),
    }
}

async fn delete_section(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match HomeSectionEntity::find_by_id(id).one(&*db).await {
        Ok(Some(model)) => {
            let model: home_section::ActiveModel = model.into();
            match model.delete(&*db).await {
                Ok(_) => (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Resource deleted successfully."
                    })),
                ),
                Err(_) => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Failed to delete this resource"
                    })),
                ),
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No section with {} id was found.", id)
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        ),
    }
}

//Structs
#[derive(Deserialize)]
struct CreateSection {
    title: String,
    category_id: Option<i32>,
    product_ids: Option<Vec<i32>>,
    order_position: Option<i32>,
}

#[derive(Deserialize)]
struct PatchSection {
    title: Option<String>,
    category_id: Option<Option<i32>>,
    product_ids: Option<Vec<i32>>,
    order_position: Option<i32>,
    status: Option<EntityStatus>,
}
