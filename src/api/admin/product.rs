use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    cart_item, category, order_item,
    product::{self, Entity as ProductEntity, ImageList, OptionSchema},
    EntityStatus,
};

//ROUTERS
pub fn admin_product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/product", post(create_product))
        .route(
            "/product/:id",
            axum::routing::get(admin_get_product)
                .patch(patch_product)
                .delete(delete_product),
        )
        .layer(Extension(db))
}

//ROUTES
async fn admin_get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    // The back office sees inactive products too, so no status filter here.
    match ProductEntity::find_by_id(id).one(&*db).await {
        Ok(Some(model)) => (StatusCode::OK, Json(model)).into_response(),
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

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateProduct>,
) -> impl IntoResponse {
    if payload.price < 0.0 || payload.stock < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Price and stock must not be negative"
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

    if let Some(category_id) = payload.category_id {
        match category::Entity::find_by_id(category_id).one(&txn).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let _ = txn.rollback().await;
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": format!("No category with {} id was found", category_id)
                    })),
                );
            }
            Err(_) => {
                let _ = txn.rollback().await;
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                );
            }
        }
    }

    let new_product = product::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        promo_price: Set(payload.promo_price),
        is_promo: Set(payload.is_promo.unwrap_or(false)),
        stock: Set(payload.stock),
        category_id: Set(payload.category_id),
        main_image: Set(payload.main_image),
        secondary_images: Set(ImageList(payload.secondary_images.unwrap_or_default())),
        options: Set(OptionSchema(payload.options.unwrap_or_default())),
        status: Set(EntityStatus::Active),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match product::Entity::insert(new_product).exec(&txn).await {
        Ok(result) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Product created successfully",
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
                    "error": "Product already exists"
                })),
            )
        }
    }
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchProduct>,
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

    match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            let mut model: product::ActiveModel = model.into();

            if let Some(name) = payload.name {
                model.name = Set(name);
            }
            if let Some(description) = payload.description {
                model.description = Set(description);
            }
            if let Some(price) = payload.price {
                if price < 0.0 {
                    let _ = txn.rollback().await;
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Price must not be negative"
                        })),
                    );
                }
                model.price = Set(price);
            }
            if let Some(promo_price) = payload.promo_price {
                model.promo_price = Set(promo_price);
            }
            if let Some(is_promo) = payload.is_promo {
                model.is_promo = Set(is_promo);
            }
            if let Some(stock) = payload.stock {
                if stock < 0 {
                    let _ = txn.rollback().await;
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Stock must not be negative"
                        })),
                    );
                }
                model.stock = Set(stock);
            }
            if let Some(category_id) = payload.category_id {
                match category::Entity::find_by_id(category_id).one(&txn).await {
                    Ok(Some(_)) => model.category_id = Set(Some(category_id)),
                    Ok(None) | Err(_) => {
                        let _ = txn.rollback().await;
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({
                                "error": format!("No category with {category_id} id was found")
                            })),
                        );
                    }
                }
            }
            if let Some(main_image) = payload.main_image {
                model.main_image = Set(Some(main_image));
            }
            if let Some(secondary_images) = payload.secondary_images {
                model.secondary_images = Set(ImageList(secondary_images));
            }
            if let Some(options) = payload.options {
                model.options = Set(OptionSchema(options));
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
                "error": format!("No product with {} id was found.", id)
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

/// A product referenced by any order is never hard-deleted; it is flipped to
/// inactive so historical orders keep a valid reference.
async fn delete_product(
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

    let model = match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No product with {} id was found.", id)
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

    let referenced = order_item::Entity::find()
        .filter(order_item::Column::ProductId.eq(id))
        .one(&txn)
        .await;

    let result = match referenced {
        Ok(Some(_)) => {
            let mut model: product::ActiveModel = model.into();
            model.status = Set(EntityStatus::Inactive);
            model.update(&txn).await.map(|_| "Product deactivated")
        }
        Ok(None) => {
            // Hard delete: any cart entries still pointing at the product go
            // with it, or their checkout would hit a missing product later.
            let purged = cart_item::Entity::delete_many()
                .filter(cart_item::Column::ProductId.eq(id))
                .exec(&txn)
                .await;
            match purged {
                Ok(_) => {
                    let model: product::ActiveModel = model.into();
                    model
                        .delete(&txn)
                        .await
                        .map(|_| "Resource deleted successfully.")
                }
                Err(err) => Err(err),
            }
        }
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            );
        }
    };

    match result {
        Ok(message) => {
            let _ = txn.commit().await;
            (
                StatusCode::OK,
                Json(json!({
                    "message": message
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
#[derive(Deserialize, Clone, Debug)]
struct CreateProduct {
    name: String,
    description: String,
    price: f32,
    promo_price: Option<f32>,
    is_promo: Option<bool>,
    stock: i32,
    category_id: Option<i32>,
    main_image: Option<String>,
    secondary_images: Option<Vec<String>>,
    options: Option<std::collections::BTreeMap<String, Vec<String>>>,
}

#[derive(Deserialize)]
struct PatchProduct {
    name: Option<String>,
    description: Option<String>,
    price: Option<f32>,
    promo_price: Option<Option<f32>>,
    is_promo: Option<bool>,
    stock: Option<i32>,
    category_id: Option<i32>,
    main_image: Option<String>,
    secondary_images: Option<Vec<String>>,
    options: Option<std::collections::BTreeMap<String, Vec<String>>>,
    status: Option<EntityStatus>,
}
