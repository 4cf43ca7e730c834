use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::entities::consent_log::{self, Entity as ConsentLogEntity};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn consent_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/consent", get(get_consents).post(record_consent))
        .layer(Extension(db))
}

//ROUTES
async fn get_consents(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let result = ConsentLogEntity::find()
        .filter(consent_log::Column::UserId.eq(claims.user_id))
        .order_by_desc(consent_log::Column::CreatedAt)
        .all(&*db)
        .await;

    match result {
        Ok(logs) => (StatusCode::OK, Json(logs)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

/// Appends a consent decision; the log is never rewritten, so every change
/// of mind stays visible.
async fn record_consent(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RecordConsent>,
) -> impl IntoResponse {
    if payload.consent_type.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Consent type must not be empty"
            })),
        );
    }

    let row = consent_log::ActiveModel {
        user_id: Set(claims.user_id),
        consent_type: Set(payload.consent_type),
        accepted: Set(payload.accepted),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match ConsentLogEntity::insert(row).exec(&*db).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Consent recorded successfully"
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

//Structs
#[derive(Deserialize)]
struct RecordConsent {
    consent_type: String,
    accepted: bool,
}
