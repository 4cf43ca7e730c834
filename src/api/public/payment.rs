use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::order::{self, Entity as OrderEntity};
use crate::middleware::logging::{to_response, ApiError};
use crate::payments::PaymentGateway;

//ROUTERS
pub fn public_payment_router(db: Arc<DatabaseConnection>, gateway: Arc<PaymentGateway>) -> Router {
    Router::new()
        .route("/payment/webhook", post(payment_webhook))
        .route("/payment/status/:preference_id", get(payment_status))
        .layer(Extension(db))
        .layer(Extension(gateway))
}

//ROUTES

/// Asynchronous push from the provider. Always answers 200 on unknown or
/// unusable references so the provider does not retry-storm us; the stored
/// `payment_status` is simply overwritten with whatever the provider says
/// now (last write wins, no ordering guarantee).
async fn payment_webhook(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(gateway): Extension<Arc<PaymentGateway>>,
    Json(payload): Json<WebhookPayload>,
) -> Response {
    let payment_id = match (payload.kind.as_deref(), payload.data) {
        (Some("payment"), Some(data)) => data.id,
        _ => {
            return to_response(
                (StatusCode::OK, Json(json!({ "received": true }))),
                Ok(()),
            );
        }
    };

    let info = match gateway.fetch_payment(&payment_id).await {
        Ok(info) => info,
        Err(err) => {
            // Best effort: the provider still gets its 200.
            return to_response(
                (StatusCode::OK, Json(json!({ "received": true }))),
                Err(ApiError::ProviderError(err.to_string())),
            );
        }
    };

    let order_id = info
        .external_reference
        .as_deref()
        .and_then(|reference| reference.parse::<i32>().ok());
    let order_model = match order_id {
        Some(id) => OrderEntity::find_by_id(id).one(&*db).await,
        None => Ok(None),
    };

    match order_model {
        Ok(Some(model)) => {
            let mut model: order::ActiveModel = model.into();
            model.payment_status = Set(info.status);
            match model.update(&*db).await {
                Ok(_) => to_response(
                    (StatusCode::OK, Json(json!({ "received": true }))),
                    Ok(()),
                ),
                Err(err) => to_response(
                    (StatusCode::OK, Json(json!({ "received": true }))),
                    Err(ApiError::DbError(err.to_string())),
                ),
            }
        }
        // Unknown reference: no-op, still a success for the provider.
        Ok(None) => to_response(
            (StatusCode::OK, Json(json!({ "received": true }))),
            Ok(()),
        ),
        Err(err) => to_response(
            (StatusCode::OK, Json(json!({ "received": true }))),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

/// Poll endpoint hit by the storefront after the provider redirects back.
/// When the redirect carries the provider's payment id the stored status is
/// refreshed from the provider first, then returned.
async fn payment_status(
    Path(preference_id): Path<String>,
    Query(params): Query<StatusQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(gateway): Extension<Arc<PaymentGateway>>,
) -> Response {
    let order_model = match OrderEntity::find()
        .filter(order::Column::PaymentPreferenceId.eq(&*preference_id))
        .one(&*db)
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("No order for preference '{}' was found.", preference_id)
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

    let mut payment_status = order_model.payment_status.clone();

    if let Some(payment_id) = params.payment_id {
        if let Ok(info) = gateway.fetch_payment(&payment_id).await {
            payment_status = info.status;
            let mut model: order::ActiveModel = order_model.clone().into();
            model.payment_status = Set(payment_status.clone());
            if let Err(err) = model.update(&*db).await {
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
        }
    }

    to_response(
        (
            StatusCode::OK,
            Json(json!({
                "order_id": order_model.id,
                "payment_status": payment_status,
            })),
        ),
        Ok(()),
    )
}

//Structs
#[derive(Deserialize, Debug)]
struct WebhookPayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Option<WebhookData>,
}

#[derive(Deserialize, Debug)]
struct WebhookData {
    id: String,
}

#[derive(Deserialize)]
struct StatusQuery {
    payment_id: Option<String>,
}
