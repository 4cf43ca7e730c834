use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    category::{self, Entity as CategoryEntity},
    product, EntityStatus,
};

//ROUTERS
pub fn admin_category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/category", get(get_categories).post(create_category))
        .route(
            "/category/:id",
            axum::routing::patch(patch_category).delete(delete_category),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    let result = CategoryEntity::find()
        .order_by_asc(category::Column::Name)
        .all(&*db)
        .await;

    match result {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateCategory>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() || payload.slug.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Name and slug must not be empty"
            })),
        );
    }

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

    let new_category = category::ActiveModel {
        name: Set(payload.name),
        slug: Set(payload.slug),
        status: Set(EntityStatus::Active),
        ..Default::default()
    };

    match CategoryEntity::insert(new_category).exec(&txn).await {
        Ok(result) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Category created successfully",
                    "id": result.last_insert_id,
                })),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
        },
        Err(_) => {
            let _ = txn.rollback().await;
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Category slug already exists"
                })),
            )
        }
    }
}

async fn patch_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCategory>,
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

    match CategoryEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            let mut model: category::ActiveModel = model.into();

            if let Some(name) = payload.name {
                model.name = Set(name);
            }
            if let Some(slug) = payload.slug {
                model.slug = Set(slug);
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
                            "error": "Category slug already exists"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No category with {} id was found.", id)
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

/// A category keeping products cannot be removed; the products must be moved
/// or deleted first.
async fn delete_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
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

    let model = match CategoryEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No category with {} id was found.", id)
                })),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    };

    match product::Entity::find()
        .filter(product::Column::CategoryId.eq(id))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Category still has products and cannot be deleted"
                })),
            );
        }
        Ok(None) => {}
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    }

    let model: category::ActiveModel = model.into();
    match model.delete(&txn).await {
        Ok(_) => {
            let _ = txn.commit().await;
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Resource deleted successfully."
                })),
            )
        }
        Err(_) => {
            let _ = txn.rollback().await;
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Failed to delete this resource"
                })),
            )
        }
    }
}

//Structs
#[derive(Deserialize)]
struct CreateCategory {
    name: String,
    slug: String,
}

#[derive(Deserialize)]
struct PatchCategory {
    name: Option<String>,
    slug: Option<String>,
    status: Option<EntityStatus>,
}
