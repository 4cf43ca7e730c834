mod common;

use common::{spawn_app, TestApp};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use grafica_store::checkout::{run_checkout, CheckoutError, CheckoutRequest};
use grafica_store::entities::{cart, cart_item, order, order_item, product, user};

async fn seed_user(app: &TestApp, email: &str) -> i32 {
    let model = user::ActiveModel {
        email: Set(email.to_owned()),
        password: Set("not-a-real-hash".to_owned()),
        name: Set("Cliente".to_owned()),
        role: Set(user::Role::User),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    user::Entity::insert(model)
        .exec(&*app.db)
        .await
        .expect("Failed to seed user")
        .last_insert_id
}

async fn seed_cart(app: &TestApp, user_id: i32, items: &[(i32, i32)]) -> i32 {
    let new_cart = cart::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let cart_id = cart::Entity::insert(new_cart)
        .exec(&*app.db)
        .await
        .expect("Failed to seed cart")
        .last_insert_id;

    for (product_id, quantity) in items {
        let entry = cart_item::ActiveModel {
            cart_id: Set(cart_id),
            product_id: Set(*product_id),
            quantity: Set(*quantity),
            options: Set(cart_item::VariantSelection::default()),
            ..Default::default()
        };
        cart_item::Entity::insert(entry)
            .exec(&*app.db)
            .await
            .expect("Failed to seed cart item");
    }

    cart_id
}

fn request() -> CheckoutRequest {
    CheckoutRequest {
        payment_method: "pix".to_owned(),
        address_data: order::AddressSnapshot {
            street: "Rua das Palmeiras".to_owned(),
            number: "120".to_owned(),
            complement: String::new(),
            district: "Centro".to_owned(),
            city: "Campinas".to_owned(),
            state: "SP".to_owned(),
            postal_code: "13010-000".to_owned(),
        },
    }
}

#[tokio::test]
async fn checkout_converts_cart_and_decrements_stock() {
    let app = spawn_app().await;
    let user_id = seed_user(&app, "comprador@test.local").await;
    let flyer = app.seed_product("Flyer A5", 10.0, 5).await;
    let banner = app.seed_product("Banner 1x1", 25.0, 1).await;
    let cart_id = seed_cart(&app, user_id, &[(flyer, 2), (banner, 1)]).await;

    let receipt = run_checkout(&app.db, user_id, request())
        .await
        .expect("Checkout should succeed");
    assert_eq!(receipt.total, 45.0);

    let placed = order::Entity::find_by_id(receipt.order_id)
        .one(&*app.db)
        .await
        .expect("Failed to load order")
        .expect("Order should exist");
    assert_eq!(placed.status, order::OrderStatus::Pending);
    assert_eq!(placed.payment_status, "pending");
    assert_eq!(placed.total_amount, 45.0);
    assert_eq!(placed.payment_method, "pix");
    assert_eq!(placed.shipping_address.postal_code, "13010-000");

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(placed.id))
        .all(&*app.db)
        .await
        .expect("Failed to load order items");
    assert_eq!(items.len(), 2);

    let flyer_row = product::Entity::find_by_id(flyer)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    let banner_row = product::Entity::find_by_id(banner)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(flyer_row.stock, 3);
    assert_eq!(banner_row.stock, 0);

    // The cart row survives, empty.
    let leftovers = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .all(&*app.db)
        .await
        .unwrap();
    assert!(leftovers.is_empty());
    assert!(cart::Entity::find_by_id(cart_id)
        .one(&*app.db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn short_stock_fails_the_whole_cart() {
    let app = spawn_app().await;
    let user_id = seed_user(&app, "sem-estoque@test.local").await;
    let flyer = app.seed_product("Flyer A5", 10.0, 5).await;
    let banner = app.seed_product("Banner 1x1", 25.0, 0).await;
    let cart_id = seed_cart(&app, user_id, &[(flyer, 2), (banner, 1)]).await;

    let result = run_checkout(&app.db, user_id, request()).await;
    assert!(matches!(
        result,
        Err(CheckoutError::InsufficientStock { ref product }) if product == "Banner 1x1"
    ));

    // Nothing moved: no order, full stock, cart intact.
    let orders = order::Entity::find().all(&*app.db).await.unwrap();
    assert!(orders.is_empty());

    let flyer_row = product::Entity::find_by_id(flyer)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(flyer_row.stock, 5);

    let leftovers = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(leftovers.len(), 2);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let app = spawn_app().await;

    let no_cart = seed_user(&app, "sem-carrinho@test.local").await;
    assert!(matches!(
        run_checkout(&app.db, no_cart, request()).await,
        Err(CheckoutError::EmptyCart)
    ));

    let empty_cart = seed_user(&app, "carrinho-vazio@test.local").await;
    seed_cart(&app, empty_cart, &[]).await;
    assert!(matches!(
        run_checkout(&app.db, empty_cart, request()).await,
        Err(CheckoutError::EmptyCart)
    ));
}

#[tokio::test]
async fn blank_payment_method_and_address_are_rejected() {
    let app = spawn_app().await;
    let user_id = seed_user(&app, "invalido@test.local").await;
    let flyer = app.seed_product("Flyer A5", 10.0, 5).await;
    seed_cart(&app, user_id, &[(flyer, 1)]).await;

    let mut no_method = request();
    no_method.payment_method = "  ".to_owned();
    assert!(matches!(
        run_checkout(&app.db, user_id, no_method).await,
        Err(CheckoutError::InvalidPaymentMethod)
    ));

    let mut no_street = request();
    no_street.address_data.street = String::new();
    assert!(matches!(
        run_checkout(&app.db, user_id, no_street).await,
        Err(CheckoutError::InvalidAddress)
    ));

    // Validation failures leave the cart alone.
    let leftovers = cart_item::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(leftovers.len(), 1);
}

#[tokio::test]
async fn order_items_freeze_name_and_price() {
    let app = spawn_app().await;
    let user_id = seed_user(&app, "snapshot@test.local").await;
    let flyer = app.seed_product("Flyer A5", 10.0, 5).await;
    seed_cart(&app, user_id, &[(flyer, 1)]).await;

    let receipt = run_checkout(&app.db, user_id, request())
        .await
        .expect("Checkout should succeed");

    // Reprice and rename the product after the sale.
    let model = product::Entity::find_by_id(flyer)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    let mut model: product::ActiveModel = model.into();
    model.name = Set("Flyer A5 (novo)".to_owned());
    model.price = Set(99.0);
    model
        .update(&*app.db)
        .await
        .expect("Failed to reprice product");

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(receipt.order_id))
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_name, "Flyer A5");
    assert_eq!(items[0].unit_price, 10.0);
}

#[tokio::test]
async fn cart_keeps_working_after_checkout() {
    let app = spawn_app().await;
    let user_id = seed_user(&app, "recompra@test.local").await;
    let flyer = app.seed_product("Flyer A5", 10.0, 5).await;
    let cart_id = seed_cart(&app, user_id, &[(flyer, 1)]).await;

    run_checkout(&app.db, user_id, request())
        .await
        .expect("First checkout should succeed");

    let entry = cart_item::ActiveModel {
        cart_id: Set(cart_id),
        product_id: Set(flyer),
        quantity: Set(2),
        options: Set(cart_item::VariantSelection::default()),
        ..Default::default()
    };
    cart_item::Entity::insert(entry)
        .exec(&*app.db)
        .await
        .expect("Cart should accept items again");

    let receipt = run_checkout(&app.db, user_id, request())
        .await
        .expect("Second checkout should succeed");
    assert_eq!(receipt.total, 20.0);

    let orders = order::Entity::find().all(&*app.db).await.unwrap();
    assert_eq!(orders.len(), 2);
}
