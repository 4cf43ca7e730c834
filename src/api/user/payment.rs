use axum::{
    extract::Extension, http::StatusCode, response::Response, routing::post, Json, Router,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    order::{self, Entity as OrderEntity},
    order_item,
};
use crate::middleware::auth::Claims;
use crate::middleware::logging::{to_response, ApiError};
use crate::payments::{CardPaymentRequest, PaymentGateway};

//ROUTERS
pub fn user_payment_router(db: Arc<DatabaseConnection>, gateway: Arc<PaymentGateway>) -> Router {
    Router::new()
        .route("/payment/create", post(create_payment))
        .route("/payment/process-card", post(process_card))
        .layer(Extension(db))
        .layer(Extension(gateway))
}

//ROUTES

/// Creates a provider checkout preference for one of the caller's orders and
/// stores the provider's correlation id on the order row.
async fn create_payment(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(gateway): Extension<Arc<PaymentGateway>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePayment>,
) -> Response {
    let order_model = match find_own_order(&db, payload.order_id, claims.user_id).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("No order with {} id was found.", payload.order_id)
                    })),
                ),
                Ok(()),
            );
        }
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error."
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    let items = match order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_model.id))
        .all(&*db)
        .await
    {
        Ok(items) => items,
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error."
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    let preference = match gateway.create_preference(&order_model, &items).await {
        Ok(preference) => preference,
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Failed to start the payment"
                    })),
                ),
                Err(ApiError::ProviderError(err.to_string())),
            );
        }
    };

    let mut model: order::ActiveModel = order_model.into();
    model.payment_preference_id = Set(Some(preference.id.clone()));
    match model.update(&*db).await {
        Ok(_) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "preference_id": preference.id,
                    "init_point": preference.init_point,
                })),
            ),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

/// Synchronous card charge: the provider's answer overwrites the order's
/// payment status in the same request.
async fn process_card(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(gateway): Extension<Arc<PaymentGateway>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CardPaymentRequest>,
) -> Response {
    let order_model = match find_own_order(&db, payload.order_id, claims.user_id).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("No order with {} id was found.", payload.order_id)
                    })),
                ),
                Ok(()),
            );
        }
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error."
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    let info = match gateway.process_card(&order_model, &payload).await {
        Ok(info) => info,
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Failed to process the card payment"
                    })),
                ),
                Err(ApiError::ProviderError(err.to_string())),
            );
        }
    };

    let order_id = order_model.id;
    let mut model: order::ActiveModel = order_model.into();
    model.payment_status = Set(info.status.clone());
    match model.update(&*db).await {
        Ok(_) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "order_id": order_id,
                    "payment_status": info.status,
                })),
            ),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn find_own_order(
    db: &DatabaseConnection,
    order_id: i32,
    user_id: i32,
) -> Result<Option<order::Model>, sea_orm::DbErr> {
    OrderEntity::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .one(db)
        .await
}

//Structs
#[derive(Deserialize)]
struct CreatePayment {
    order_id: i32,
}
