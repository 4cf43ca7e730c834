pub mod banner;
pub mod category;
pub mod home_section;
pub mod order;
pub mod product;
pub mod settings;
pub mod upload;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};

use banner::admin_banner_router;
use category::admin_category_router;
use home_section::admin_home_section_router;
use order::admin_order_router;
use product::admin_product_router;
use settings::admin_settings_router;
use upload::upload_router;

pub fn admin_api_router(db: Arc<DatabaseConnection>, config: Arc<AppConfig>) -> Router {
    let admin_order_router = admin_order_router(db.clone());
    let admin_product_router = admin_product_router(db.clone());
    let admin_category_router = admin_category_router(db.clone());
    let admin_banner_router = admin_banner_router(db.clone());
    let admin_home_section_router = admin_home_section_router(db.clone());
    let admin_settings_router = admin_settings_router(db.clone(), config.clone());
    let upload_router = upload_router(config);

    Router::new()
        .nest("/", admin_order_router)
        .nest("/", admin_product_router)
        .nest("/", admin_category_router)
        .nest("/", admin_banner_router)
        .nest("/", admin_home_section_router)
        .nest("/", admin_settings_router)
        .nest("/", upload_router)
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
