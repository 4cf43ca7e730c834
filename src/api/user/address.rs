use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user_address::{self, AddressKind, Entity as AddressEntity};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn address_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/address", get(get_addresses).post(create_address))
        .route(
            "/address/:id",
            get(get_address).patch(patch_address).delete(delete_address),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_addresses(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let result = AddressEntity::find()
        .filter(user_address::Column::UserId.eq(claims.user_id))
        .all(&*db)
        .await;

    match result {
        Ok(addresses) => (StatusCode::OK, Json(addresses)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn get_address(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let result = AddressEntity::find_by_id(id)
        .filter(user_address::Column::UserId.eq(claims.user_id))
        .one(&*db)
        .await;

    match result {
        Ok(Some(model)) => (StatusCode::OK, Json(model)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No address with {} id was found.", id)
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

async fn create_address(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAddress>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Invalid address data: {}", err)
            })),
        );
    }

    let kind = match AddressKind::from_str(&payload.kind) {
        Ok(kind) => kind,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": err
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

    let is_default = payload.is_default.unwrap_or(false);

    // At most one default per user per kind; the siblings are cleared in the
    // same transaction. The other kind is left untouched.
    if is_default {
        let cleared = AddressEntity::update_many()
            .col_expr(user_address::Column::IsDefault, Expr::value(false))
            .filter(user_address::Column::UserId.eq(claims.user_id))
            .filter(user_address::Column::Kind.eq(kind))
            .exec(&txn)
            .await;
        if cleared.is_err() {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    }

    let new_address = user_address::ActiveModel {
        user_id: Set(claims.user_id),
        kind: Set(kind),
        is_default: Set(is_default),
        street: Set(payload.street),
        number: Set(payload.number),
        complement: Set(payload.complement.unwrap_or_default()),
        district: Set(payload.district.unwrap_or_default()),
        city: Set(payload.city),
        state: Set(payload.state),
        postal_code: Set(payload.postal_code),
        ..Default::default()
    };

    match AddressEntity::insert(new_address).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Address created successfully"
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

async fn patch_address(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchAddress>,
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

    let found = AddressEntity::find_by_id(id)
        .filter(user_address::Column::UserId.eq(claims.user_id))
        .one(&txn)
        .await;

    match found {
        Ok(Some(model)) => {
            let kind = model.kind;
            let mut model: user_address::ActiveModel = model.into();

            if let Some(street) = payload.street {
                model.street = Set(street);
            }
            if let Some(number) = payload.number {
                model.number = Set(number);
            }
            if let Some(complement) = payload.complement {
                model.complement = Set(complement);
            }
            if let Some(district) = payload.district {
                model.district = Set(district);
            }
            if let Some(city) = payload.city {
                model.city = Set(city);
            }
            if let Some(state) = payload.state {
                model.state = Set(state);
            }
            if let Some(postal_code) = payload.postal_code {
                model.postal_code = Set(postal_code);
            }
            if let Some(is_default) = payload.is_default {
                if is_default {
                    let cleared = AddressEntity::update_many()
                        .col_expr(user_address::Column::IsDefault, Expr::value(false))
                        .filter(user_address::Column::UserId.eq(claims.user_id))
                        .filter(user_address::Column::Kind.eq(kind))
                        .exec(&txn)
                        .await;
                    if cleared.is_err() {
                        let _ = txn.rollback().await;
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Internal server error"
                            })),
                        );
                    }
                }
                model.is_default = Set(is_default);
            }

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
                "error": format!("No address with {} id was found.", id)
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

async fn delete_address(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let found = AddressEntity::find_by_id(id)
        .filter(user_address::Column::UserId.eq(claims.user_id))
        .one(&*db)
        .await;

    match found {
        Ok(Some(model)) => {
            let model: user_address::ActiveModel = model.into();
            match model.delete(&*db).await {
                Ok(_) => (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Resource deleted successfully"
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
                "error": format!("No address with {} id was found.", id)
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
#[derive(Deserialize, Validate)]
struct CreateAddress {
    kind: String,
    is_default: Option<bool>,
    #[validate(length(min = 1))]
    street: String,
    number: String,
    complement: Option<String>,
    district: Option<String>,
    city: String,
    state: String,
    #[validate(length(min = 1))]
    postal_code: String,
}

#[derive(Deserialize)]
struct PatchAddress {
    is_default: Option<bool>,
    street: Option<String>,
    number: Option<String>,
    complement: Option<String>,
    district: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
}
