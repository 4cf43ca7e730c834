use axum::{
    extract::{Extension, Path},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::config::AppConfig;
use crate::middleware::logging::{to_response, ApiError};

// Uploaded names are uuid + extension; anything else (dots, slashes) is
// rejected before touching the filesystem.
static FILE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+\.[A-Za-z0-9]+$").expect("Invalid file name regex"));

pub fn uploads_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/uploads/:file", get(serve_upload))
        .route("/uploads/products/:file", get(serve_product_upload))
        .layer(Extension(config))
}

async fn serve_upload(
    Path(file): Path<String>,
    Extension(config): Extension<Arc<AppConfig>>,
) -> Response {
    serve_from_dir(&config.upload_dir, &file).await
}

async fn serve_product_upload(
    Path(file): Path<String>,
    Extension(config): Extension<Arc<AppConfig>>,
) -> Response {
    serve_from_dir(&config.product_upload_dir, &file).await
}

async fn serve_from_dir(dir: &str, file: &str) -> Response {
    if !FILE_NAME_REGEX.is_match(file) {
        return to_response(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid file name"
                })),
            ),
            Err(ApiError::ValidationFail("file name".to_string())),
        );
    }

    let path = format!("{}/{}", dir, file);
    let opened = match tokio::fs::File::open(&path).await {
        Ok(opened) => opened,
        Err(err) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": "Not found"
                    })),
                ),
                Err(ApiError::IoError(err.to_string())),
            );
        }
    };

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let stream = ReaderStream::new(opened);
    let body = axum::body::Body::from_stream(stream);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    to_response((headers, body), Ok(()))
}
