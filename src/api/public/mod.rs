pub mod auth;
pub mod category;
pub mod home;
pub mod payment;
pub mod product;
pub mod uploads;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::payments::PaymentGateway;

use auth::auth_router;
use category::category_router;
use home::home_router;
use payment::public_payment_router;
use product::product_router;
use uploads::uploads_router;

pub fn public_api_router(
    db: Arc<DatabaseConnection>,
    gateway: Arc<PaymentGateway>,
    config: Arc<AppConfig>,
) -> Router {
    let auth_router = auth_router(db.clone());
    let category_router = category_router(db.clone());
    let product_router = product_router(db.clone());
    let home_router = home_router(db.clone());
    let payment_router = public_payment_router(db.clone(), gateway);
    let uploads_router = uploads_router(config);

    Router::new()
        .nest("/", auth_router)
        .nest("/", category_router)
        .nest("/", product_router)
        .nest("/", home_router)
        .nest("/", payment_router)
        .nest("/", uploads_router)
}
