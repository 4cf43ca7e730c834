mod common;

use common::{checkout_body, spawn_app, TestApp};

async fn place_order(app: &TestApp, token: &str) -> i64 {
    let flyer = app
        .seed_product(&format!("Produto {}", uuid::Uuid::new_v4()), 10.0, 10)
        .await;
    app.add_to_cart(token, flyer, 1).await;

    let body = app
        .client
        .post(format!("{}/api/cart/checkout", app.address))
        .bearer_auth(token)
        .json(&checkout_body())
        .send()
        .await
        .expect("Failed to send checkout request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse checkout response");
    body["order_id"].as_i64().expect("Checkout returned no id")
}

async fn set_status(app: &TestApp, admin: &str, order_id: i64, status: &str) -> reqwest::Response {
    app.client
        .patch(format!("{}/api/admin/order/{}", app.address, order_id))
        .bearer_auth(admin)
        .json(&serde_json::json!({ "status": status }))
        .send()
        .await
        .expect("Failed to send status patch")
}

#[tokio::test]
async fn admin_walks_an_order_through_the_lifecycle() {
    let app = spawn_app().await;
    let customer = app.register_and_login("cliente@test.local").await;
    let admin = app.admin_token().await;
    let order_id = place_order(&app, &customer).await;

    for status in ["novo", "producao", "enviado", "concluido"] {
        let response = set_status(&app, &admin, order_id, status).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "failed to set {status}"
        );
    }

    let body = app
        .client
        .get(format!("{}/api/admin/order/{}", app.address, order_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(body["order"]["status"], "concluido");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn terminal_orders_refuse_further_changes() {
    let app = spawn_app().await;
    let customer = app.register_and_login("cancelado@test.local").await;
    let admin = app.admin_token().await;
    let order_id = place_order(&app, &customer).await;

    let response = set_status(&app, &admin, order_id, "cancelado").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = set_status(&app, &admin, order_id, "novo").await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(
        body["error"],
        "Order is already cancelado and cannot change status"
    );
}

#[tokio::test]
async fn status_values_outside_the_allow_list_are_rejected() {
    let app = spawn_app().await;
    let customer = app.register_and_login("validado@test.local").await;
    let admin = app.admin_token().await;
    let order_id = place_order(&app, &customer).await;

    // "pending" is the creation state, not settable by hand.
    for status in ["despachado", "PENDING", "pending", ""] {
        let response = set_status(&app, &admin, order_id, status).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::BAD_REQUEST,
            "'{status}' should be rejected"
        );
    }
}

#[tokio::test]
async fn admin_list_filters_by_status() {
    let app = spawn_app().await;
    let customer = app.register_and_login("listado@test.local").await;
    let admin = app.admin_token().await;

    let first = place_order(&app, &customer).await;
    let _second = place_order(&app, &customer).await;
    set_status(&app, &admin, first, "novo").await;

    let body = app
        .client
        .get(format!("{}/api/admin/order?status=novo", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"].as_i64().unwrap(), first);

    let response = app
        .client
        .get(format!("{}/api/admin/order?status=errado", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_only_see_their_own_orders() {
    let app = spawn_app().await;
    let first = app.register_and_login("primeiro@test.local").await;
    let second = app.register_and_login("segundo@test.local").await;

    let first_order = place_order(&app, &first).await;
    place_order(&app, &second).await;

    let body = app
        .client
        .get(format!("{}/api/order", app.address))
        .bearer_auth(&first)
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"].as_i64().unwrap(), first_order);

    // Detail of a foreign order looks like a missing one.
    let response = app
        .client
        .get(format!("{}/api/order/{}", app.address, first_order))
        .bearer_auth(&second)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
