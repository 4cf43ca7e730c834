pub mod address;
pub mod cart;
pub mod consent;
pub mod order;
pub mod payment;
pub mod profile;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use crate::payments::PaymentGateway;

use address::address_router;
use cart::cart_router;
use consent::consent_router;
use order::order_router;
use payment::user_payment_router;
use profile::profile_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, gateway: Arc<PaymentGateway>) -> Router {
    Router::new()
        .nest("/", cart_router(db.clone()))
        .nest("/", address_router(db.clone()))
        .nest("/", order_router(db.clone()))
        .nest("/", user_payment_router(db.clone(), gateway))
        .nest("/", consent_router(db.clone()))
        .nest("/", profile_router(db.clone()))
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                role: Role::User,
            },
            auth_middleware,
        ))
}
