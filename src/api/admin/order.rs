use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use crate::entities::{
    order::{self, Entity as OrderEntity, OrderStatus},
    order_item,
};

//ROUTERS
pub fn admin_order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order", get(get_orders))
        .route("/order/:id", get(get_order).patch(patch_order))
        .layer(Extension(db))
}

//ROUTES
async fn get_orders(
    Query(params): Query<GetOrdersQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let mut half_result = OrderEntity::find();

    if let Some(status) = params.status {
        match OrderStatus::from_str(&status) {
            Ok(status) => {
                half_result = half_result.filter(order::Column::Status.eq(status));
            }
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": err
                    })),
                )
                    .into_response();
            }
        }
    }

    let page: u64 = params.page.unwrap_or(1).max(1);
    let page_size: u64 = params.page_size.unwrap_or(20).clamp(1, 100);

    let result = half_result
        .order_by_desc(order::Column::CreatedAt)
        .limit(page_size)
        .offset((page - 1) * page_size)
        .all(&*db)
        .await;

    match result {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let model = match OrderEntity::find_by_id(id).one(&*db).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No order with {} id was found.", id)
                })),
            )
                .into_response();
        }
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

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(model.id))
        .all(&*db)
        .await
        .unwrap_or_else(|_| vec![]);

    (
        StatusCode::OK,
        Json(json!({
            "order": model,
            "items": items,
        })),
    )
        .into_response()
}

/// Moves an order through the fulfillment lifecycle. The value must be on
/// the allow-list and terminal orders (concluido, cancelado) stay put.
async fn patch_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchOrder>,
) -> impl IntoResponse {
    let next = match OrderStatus::admin_settable(&payload.status) {
        Some(status) => status,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("Invalid status: {}", payload.status)
                })),
            );
        }
    };

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

    match OrderEntity::find_by_id(id).one(&txn).await {
        Ok(Some(model)) => {
            if model.status.is_terminal() {
                let _ = txn.rollback().await;
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": format!(
                            "Order is already {} and cannot change status",
                            model.status.to_string()
                        )
                    })),
                );
            }

            let mut model: order::ActiveModel = model.into();
            model.status = Set(next);
            match model.update(&txn).await {
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
                "error": format!("No order with {} id was found.", id)
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
struct GetOrdersQuery {
    status: Option<String>,
    page: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Deserialize)]
struct PatchOrder {
    status: String,
}
