use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::checkout::{run_checkout, CheckoutError, CheckoutRequest};
use crate::entities::{
    cart, cart_item,
    cart_item::{Entity as CartItemEntity, VariantSelection},
    product, EntityStatus,
};
use crate::middleware::auth::Claims;
use crate::middleware::logging::{to_response, ApiError};

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart", get(get_cart).post(add_product))
        .route("/cart/checkout", post(checkout))
        .route("/cart/:id", patch(patch_entry).delete(remove_product))
        .layer(Extension(db))
}

//ROUTES
async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let user_id = claims.user_id;

    let user_cart = match get_or_create_cart(&*db, user_id).await {
        Ok(model) => model,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response();
        }
    };

    let items = CartItemEntity::find()
        .filter(cart_item::Column::CartId.eq(user_cart.id))
        .join(JoinType::InnerJoin, cart_item::Relation::Product.def())
        .column_as(product::Column::Name, "name")
        .column_as(product::Column::Price, "price")
        .column_as(product::Column::MainImage, "main_image")
        .into_model::<CartItemResponse>()
        .all(&*db)
        .await;

    match items {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({
                "cart_id": user_cart.id,
                "items": items,
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

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddProduct>,
) -> impl IntoResponse {
    let user_id = claims.user_id;

    if payload.quantity < 1 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Quantity should be greater than 0"
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

    match product::Entity::find_by_id(payload.product_id)
        .filter(product::Column::Status.eq(EntityStatus::Active))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("No product with {} id was found", payload.product_id)
                })),
            );
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
    }

    let user_cart = match get_or_create_cart(&txn, user_id).await {
        Ok(model) => model,
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    //One row per (cart, product): an existing entry grows instead of duplicating.
    if let Ok(Some(entry)) = CartItemEntity::find()
        .filter(cart_item::Column::CartId.eq(user_cart.id))
        .filter(cart_item::Column::ProductId.eq(payload.product_id))
        .one(&txn)
        .await
    {
        let mut entry: cart_item::ActiveModel = entry.into();
        // Saturate instead of wrapping when a client hammers the endpoint.
        entry.quantity = Set(entry.quantity.unwrap().saturating_add(payload.quantity));
        let result = entry.update(&txn).await.map(|_| ());
        return match result {
            Ok(_) => match txn.commit().await {
                Ok(_) => (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Resource patched successfully"
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
                        "error": "Failed to patch this resource"
                    })),
                )
            }
        };
    }

    let new_entry = cart_item::ActiveModel {
        cart_id: Set(user_cart.id),
        product_id: Set(payload.product_id),
        quantity: Set(payload.quantity),
        options: Set(VariantSelection(payload.options.unwrap_or_default())),
        ..Default::default()
    };
    match CartItemEntity::insert(new_entry).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Added successfully"
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
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
        }
    }
}

async fn patch_entry(
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCartItem>,
) -> impl IntoResponse {
    let user_id = claims.user_id;

    if payload.quantity < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Quantity should not be negative"
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

    match find_own_item(&txn, id, user_id).await {
        Ok(Some(entry)) => {
            let result: Result<(), DbErr> = match payload.quantity {
                0 => {
                    let entry: cart_item::ActiveModel = entry.into();
                    entry.delete(&txn).await.map(|_| ())
                }
                quantity => {
                    let mut entry: cart_item::ActiveModel = entry.into();
                    entry.quantity = Set(quantity);
                    entry.update(&txn).await.map(|_| ())
                }
            };
            match result {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully"
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
                "error": format!("No related entry with {} id was found.", id)
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

async fn remove_product(
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let user_id = claims.user_id;
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

    match find_own_item(&txn, id, user_id).await {
        Ok(Some(entry)) => {
            let entry: cart_item::ActiveModel = entry.into();
            match entry.delete(&txn).await {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource deleted successfully"
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
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No related entry with {} id was found.", id)
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

async fn checkout(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CheckoutRequest>,
) -> Response {
    match run_checkout(&db, claims.user_id, payload).await {
        Ok(receipt) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Order created successfully",
                    "order_id": receipt.order_id,
                    "total": receipt.total,
                })),
            ),
            Ok(()),
        ),
        Err(CheckoutError::Db(err)) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
        Err(err) => to_response(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": err.to_string()
                })),
            ),
            Err(ApiError::General(err.to_string())),
        ),
    }
}

/// The cart is created lazily on first access and survives checkout empty.
async fn get_or_create_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<cart::Model, DbErr> {
    if let Some(model) = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    {
        return Ok(model);
    }

    let new_cart = cart::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    new_cart.insert(conn).await
}

async fn find_own_item<C: ConnectionTrait>(
    conn: &C,
    item_id: i32,
    user_id: i32,
) -> Result<Option<cart_item::Model>, DbErr> {
    let entry = match CartItemEntity::find_by_id(item_id).one(conn).await? {
        Some(entry) => entry,
        None => return Ok(None),
    };
    let owned = cart::Entity::find_by_id(entry.cart_id)
        .filter(cart::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(owned.map(|_| entry))
}

//Structs
#[derive(Deserialize, Debug)]
struct AddProduct {
    product_id: i32,
    quantity: i32,
    options: Option<std::collections::BTreeMap<String, String>>,
}

#[derive(Deserialize)]
struct PatchCartItem {
    quantity: i32,
}

#[derive(Serialize, FromQueryResult)]
struct CartItemResponse {
    id: i32,
    product_id: i32,
    quantity: i32,
    options: VariantSelection,
    name: String,
    price: f32,
    main_image: Option<String>,
}
