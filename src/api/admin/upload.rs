use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::fs as tokio_fs;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::middleware::logging::{to_response, ApiError};

const DEFAULT_FILE_SIZE_LIMIT: usize = 5 * 1024 * 1024;

//ROUTERS
pub fn upload_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/upload/product", post(upload_product_file))
        .layer(Extension(config))
}

//ROUTES
async fn upload_file(
    Extension(config): Extension<Arc<AppConfig>>,
    multipart: Multipart,
) -> Response {
    match store_upload_field(&config.upload_dir, "uploads", multipart).await {
        Ok(path) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "File uploaded successfully.",
                    "path": path,
                })),
            ),
            Ok(()),
        ),
        Err(response) => response,
    }
}

async fn upload_product_file(
    Extension(config): Extension<Arc<AppConfig>>,
    multipart: Multipart,
) -> Response {
    match store_upload_field(&config.product_upload_dir, "uploads/products", multipart).await {
        Ok(path) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "File uploaded successfully.",
                    "path": path,
                })),
            ),
            Ok(()),
        ),
        Err(response) => response,
    }
}

//utils
/// Reads the first multipart field, validates it and writes the bytes under
/// `dir` with a random file name. Returns the public path (`prefix/<name>`)
/// on success, a ready error response otherwise.
pub async fn store_upload_field(
    dir: &str,
    prefix: &str,
    mut multipart: Multipart,
) -> Result<String, Response> {
    let field = match multipart.next_field().await.unwrap_or(None) {
        Some(field) => field,
        None => {
            let tmp = "No file field in the request";
            return Err(to_response(
                (StatusCode::BAD_REQUEST, Json(json!({"error": tmp}))),
                Err(ApiError::General(tmp.to_string())),
            ));
        }
    };

    let content_type = match field.content_type() {
        Some(content_type) => content_type.to_owned(),
        None => {
            let tmp = "Content type is not set.";
            return Err(to_response(
                (StatusCode::BAD_REQUEST, Json(json!({"error": tmp}))),
                Err(ApiError::General(tmp.to_string())),
            ));
        }
    };

    let file_extension = match allowed_content_types().get(content_type.as_str()) {
        Some(&ext) => ext,
        None => {
            let tmp = "Unsupported content type.";
            return Err(to_response(
                (StatusCode::BAD_REQUEST, Json(json!({"error": tmp}))),
                Err(ApiError::General(tmp.to_string())),
            ));
        }
    };

    let field_name = match field.name() {
        Some(name) => name.to_owned(),
        None => {
            let tmp = "File name is not set.";
            return Err(to_response(
                (StatusCode::BAD_REQUEST, Json(json!({"error": tmp}))),
                Err(ApiError::General(tmp.to_string())),
            ));
        }
    };

    if !FIELD_NAME_REGEX.is_match(&field_name) {
        return Err(to_response(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid file name. It should contain only Latin letters, numbers, '-', or '_'."
                })),
            ),
            Err(ApiError::General("Regex match failed".to_string())),
        ));
    }

    let data = match field.bytes().await {
        Ok(data) => data,
        Err(err) => {
            return Err(to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Failed to read file bytes."
                    })),
                ),
                Err(ApiError::General(format!("Multipart error: {err}"))),
            ));
        }
    };
    if data.len() > file_size_limit() {
        let tmp = "Payload too large";
        return Err(to_response(
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({
                    "error": tmp
                })),
            ),
            Err(ApiError::General(tmp.to_string())),
        ));
    }

    if let Err(err) = tokio_fs::create_dir_all(dir).await {
        return Err(to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to upload file to the server"
                })),
            ),
            Err(ApiError::IoError(err.to_string())),
        ));
    }

    let stored_name = format!("{}.{}", Uuid::new_v4(), file_extension);
    match tokio_fs::write(format!("{dir}/{stored_name}"), data).await {
        Ok(_) => Ok(format!("{prefix}/{stored_name}")),
        Err(err) => Err(to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to upload file to the server"
                })),
            ),
            Err(ApiError::IoError(err.to_string())),
        )),
    }
}

fn allowed_content_types() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/webp", "webp"),
    ])
}

static FIELD_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").unwrap());

fn file_size_limit() -> usize {
    std::env::var("FILE_SIZE_LIMIT")
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(DEFAULT_FILE_SIZE_LIMIT)
}
