use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::admin::upload::store_upload_field;
use crate::config::AppConfig;
use crate::entities::site_setting::{self, Entity as SettingEntity};
use crate::middleware::logging::{to_response, ApiError};

const DISPLAY_MODES: [&str; 3] = ["default", "category", "custom"];

//ROUTERS
pub fn admin_settings_router(db: Arc<DatabaseConnection>, config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/settings", get(get_settings).put(put_settings))
        .route("/settings/logo", post(upload_logo))
        .layer(Extension(db))
        .layer(Extension(config))
}

//ROUTES
async fn get_settings(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match SettingEntity::find().all(&*db).await {
        Ok(rows) => {
            let map: HashMap<String, String> = rows
                .into_iter()
                .map(|row| (row.setting_key, row.setting_value))
                .collect();
            (StatusCode::OK, Json(map)).into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

/// Bulk upsert of the flat key/value settings. The homepage display mode is
/// checked against the known modes before anything is written.
async fn put_settings(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PutSettings>,
) -> impl IntoResponse {
    if let Some(mode) = payload.settings.get("home_display_mode") {
        if !DISPLAY_MODES.contains(&mode.as_str()) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("Invalid display mode: {}", mode)
                })),
            );
        }
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

    for (key, value) in payload.settings {
        if upsert_setting(&txn, &key, &value).await.is_err() {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    }

    match txn.commit().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "message": "Settings saved successfully"
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

/// Stores the uploaded logo under the generic upload dir and points the
/// `logo_path` setting at it.
async fn upload_logo(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<AppConfig>>,
    multipart: Multipart,
) -> Response {
    let stored = match store_upload_field(&config.upload_dir, "uploads", multipart).await {
        Ok(stored) => stored,
        Err(response) => return response,
    };

    match upsert_setting(&*db, "logo_path", &stored).await {
        Ok(_) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Logo uploaded successfully",
                    "path": stored,
                })),
            ),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn upsert_setting<C: sea_orm::ConnectionTrait>(
    conn: &C,
    key: &str,
    value: &str,
) -> Result<(), DbErr> {
    match SettingEntity::find()
        .filter(site_setting::Column::SettingKey.eq(key))
        .one(conn)
        .await?
    {
        Some(model) => {
            let mut model: site_setting::ActiveModel = model.into();
            model.setting_value = Set(value.to_owned());
            model.update(conn).await?;
        }
        None => {
            let row = site_setting::ActiveModel {
                setting_key: Set(key.to_owned()),
                setting_value: Set(value.to_owned()),
                ..Default::default()
            };
            SettingEntity::insert(row).exec(conn).await?;
        }
    }
    Ok(())
}

//Structs
#[derive(Deserialize)]
struct PutSettings {
    settings: HashMap<String, String>,
}
