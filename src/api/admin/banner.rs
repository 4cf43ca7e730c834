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
    banner::{self, Entity as BannerEntity},
    EntityStatus,
};

//ROUTERS
pub fn admin_banner_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/banner", get(get_banners).post(create_banner))
        .route(
            "/banner/:id",
            axum::routing::patch(patch_banner).delete(delete_banner),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_banners(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    let result = BannerEntity::find()
        .order_by_asc(banner::Column::OrderPosition)
        .all(&*db)
        .await;

    match result {
        Ok(banners) => (StatusCode::OK, Json(banners)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn create_banner(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateBanner>,
) -> impl IntoResponse {
    if payload.title.trim().is_empty() || payload.image.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Title and image must not be empty"
            })),
        );
    }

    let new_banner = banner::ActiveModel {
        title: Set(payload.title),
        image: Set(payload.image),
        link: Set(payload.link),
        order_position: Set(payload.order_position.unwrap_or(0)),
        status: Set(EntityStatus::Active),
        ..Default::default()
    };

    match BannerEntity::insert(new_banner).exec(&*db).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Banner created successfully",
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

async fn patch_banner(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchBanner>,
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

    match BannerEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            let mut model: banner::ActiveModel = model.into();

            if let Some(title) = payload.title {
                model.title = Set(title);
            }
            if let Some(image) = payload.image {
                model.image = Set(image);
            }
            if let Some(link) = payload.link {
                model.link = Set(link);
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
                "error": format!("No banner with {} id was found.", id)
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

async fn delete_banner(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match BannerEntity::find_by_id(id).one(&*db).await {
        Ok(Some(model)) => {
            let model: banner::ActiveModel = model.into();
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
                "error": format!("No banner with {} id was found.", id)
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
struct CreateBanner {
    title: String,
    image: String,
    link: Option<String>,
    order_position: Option<i32>,
}

#[derive(Deserialize)]
struct PatchBanner {
    title: Option<String>,
    image: Option<String>,
    link: Option<Option<String>>,
    order_position: Option<i32>,
    status: Option<EntityStatus>,
}
