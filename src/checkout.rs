//! The cart-to-order transaction: reads the cart, validates stock, computes
//! the total, inserts the order with its item snapshots, decrements stock and
//! clears the cart — all inside one all-or-nothing transaction.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use thiserror::Error;

use crate::entities::{cart, cart_item, order, order::AddressSnapshot, order_item, product};

/// Flat-rate shipping stub. The source system never computed shipping.
const SHIPPING_COST: f32 = 0.0;

#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: String,
    pub address_data: AddressSnapshot,
}

#[derive(Clone, Debug)]
pub struct CheckoutReceipt {
    pub order_id: i32,
    pub total: f32,
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Insufficient stock for product '{product}'")]
    InsufficientStock { product: String },
    #[error("Product with id {0} no longer exists")]
    UnknownProduct(i32),
    #[error("Payment method must not be empty")]
    InvalidPaymentMethod,
    #[error("Address must contain a street and a postal code")]
    InvalidAddress,
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// Converts the user's cart into a durable order exactly once, or fails with
/// no partial effect. Stock is checked against the cart quantities and
/// decremented in the same transaction; any failure rolls everything back.
///
/// Note: no row locking or isolation upgrade is requested here, so two
/// concurrent checkouts of the same product race on the stock check exactly
/// as far as the pool's default isolation lets them.
pub async fn run_checkout(
    db: &DatabaseConnection,
    user_id: i32,
    request: CheckoutRequest,
) -> Result<CheckoutReceipt, CheckoutError> {
    if request.payment_method.trim().is_empty() {
        return Err(CheckoutError::InvalidPaymentMethod);
    }
    if request.address_data.street.trim().is_empty()
        || request.address_data.postal_code.trim().is_empty()
    {
        return Err(CheckoutError::InvalidAddress);
    }

    let txn = db.begin().await?;

    let user_cart = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;
    let user_cart = match user_cart {
        Some(model) => model,
        None => {
            let _ = txn.rollback().await;
            return Err(CheckoutError::EmptyCart);
        }
    };

    let items = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(user_cart.id))
        .all(&txn)
        .await?;
    if items.is_empty() {
        let _ = txn.rollback().await;
        return Err(CheckoutError::EmptyCart);
    }

    // Stock is validated for every line before any write happens, so a short
    // line late in the cart never leaves a half-built order behind.
    let mut lines: Vec<(cart_item::Model, product::Model)> = Vec::with_capacity(items.len());
    let mut subtotal: f32 = 0.0;
    for item in items {
        let prod = match product::Entity::find_by_id(item.product_id).one(&txn).await? {
            Some(model) => model,
            None => {
                let _ = txn.rollback().await;
                return Err(CheckoutError::UnknownProduct(item.product_id));
            }
        };
        if item.quantity > prod.stock {
            let _ = txn.rollback().await;
            return Err(CheckoutError::InsufficientStock { product: prod.name });
        }
        // Current catalog price on purpose: the promo price is not applied
        // at checkout in the source system.
        subtotal += prod.price * item.quantity as f32;
        lines.push((item, prod));
    }

    let total = subtotal + SHIPPING_COST;

    let new_order = order::ActiveModel {
        user_id: Set(user_id),
        status: Set(order::OrderStatus::Pending),
        payment_status: Set("pending".to_owned()),
        total_amount: Set(total),
        payment_method: Set(request.payment_method),
        shipping_address: Set(request.address_data),
        payment_preference_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let new_order = new_order.insert(&txn).await?;

    for (item, prod) in lines {
        let snapshot = order_item::ActiveModel {
            order_id: Set(new_order.id),
            product_id: Set(prod.id),
            product_name: Set(prod.name.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(prod.price),
            selected_options: Set(item.options),
            ..Default::default()
        };
        order_item::Entity::insert(snapshot).exec(&txn).await?;

        let remaining = prod.stock - item.quantity;
        let mut prod: product::ActiveModel = prod.into();
        prod.stock = Set(remaining);
        prod.update(&txn).await?;
    }

    // The cart row survives empty and keeps receiving items afterwards.
    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(user_cart.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(CheckoutReceipt {
        order_id: new_order.id,
        total,
    })
}
