mod common;

use common::{spawn_app, TestApp};

async fn create_category(app: &TestApp, admin: &str, name: &str, slug: &str) -> reqwest::Response {
    app.client
        .post(format!("{}/api/admin/category", app.address))
        .bearer_auth(admin)
        .json(&serde_json::json!({ "name": name, "slug": slug }))
        .send()
        .await
        .expect("Failed to send create-category request")
}

async fn public_products(app: &TestApp, query: &str) -> Vec<serde_json::Value> {
    app.client
        .get(format!("{}/api/product{}", app.address, query))
        .send()
        .await
        .expect("Failed to list products")
        .json::<Vec<serde_json::Value>>()
        .await
        .expect("Failed to parse product list")
}

#[tokio::test]
async fn storefront_hides_inactive_products() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let visible = app.seed_product("Cartao de Visita", 15.0, 100).await;
    let hidden = app.seed_product("Produto Suspenso", 20.0, 10).await;

    let response = app
        .client
        .patch(format!("{}/api/admin/product/{}", app.address, hidden))
        .bearer_auth(&admin)
        .json(&serde_json::json!({ "status": "inactive" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let rows = public_products(&app, "").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"].as_i64().unwrap() as i32, visible);

    let response = app
        .client
        .get(format!("{}/api/product/{}", app.address, hidden))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    // The back office still sees it.
    let response = app
        .client
        .get(format!("{}/api/admin/product/{}", app.address, hidden))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn search_matches_name_and_description() {
    let app = spawn_app().await;
    app.seed_product("Adesivo Redondo", 5.0, 100).await;
    app.seed_product("Cartaz A3", 12.0, 100).await;

    let rows = public_products(&app, "?search=Adesivo").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Adesivo Redondo");

    // seed_product writes "<name> de teste" into the description.
    let rows = public_products(&app, "?search=de%20teste").await;
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn product_list_is_paginated() {
    let app = spawn_app().await;
    for i in 0..5 {
        app.seed_product(&format!("Produto {i}"), 10.0, 10).await;
    }

    let first = public_products(&app, "?page=1&page_size=2").await;
    assert_eq!(first.len(), 2);
    let third = public_products(&app, "?page=3&page_size=2").await;
    assert_eq!(third.len(), 1);
}

#[tokio::test]
async fn duplicate_category_slug_is_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = create_category(&app, &admin, "Papelaria", "papelaria").await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let response = create_category(&app, &admin, "Papelaria 2", "papelaria").await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["error"], "Category slug already exists");
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let body = create_category(&app, &admin, "Banners", "banners")
        .await
        .json::<serde_json::Value>()
        .await
        .unwrap();
    let category_id = body["id"].as_i64().unwrap();

    let response = app
        .client
        .post(format!("{}/api/admin/product", app.address))
        .bearer_auth(&admin)
        .json(&serde_json::json!({
            "name": "Banner Grande",
            "description": "Banner em lona",
            "price": 80.0,
            "stock": 3,
            "category_id": category_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let product_id = response.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap();

    let response = app
        .client
        .delete(format!("{}/api/admin/category/{}", app.address, category_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    // After removing the product the category goes away.
    let response = app
        .client
        .delete(format!("{}/api/admin/product/{}", app.address, product_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = app
        .client
        .delete(format!("{}/api/admin/category/{}", app.address, category_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = app
        .client
        .get(format!("{}/api/category/banners", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_prices_and_stock_are_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    for body in [
        serde_json::json!({ "name": "Errado 1", "description": "x", "price": -1.0, "stock": 5 }),
        serde_json::json!({ "name": "Errado 2", "description": "x", "price": 1.0, "stock": -5 }),
    ] {
        let response = app
            .client
            .post(format!("{}/api/admin/product", app.address))
            .bearer_auth(&admin)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn home_defaults_to_the_most_recent_products() {
    let app = spawn_app().await;
    app.seed_product("Produto Um", 10.0, 10).await;
    app.seed_product("Produto Dois", 10.0, 10).await;

    let body = app
        .client
        .get(format!("{}/api/home", app.address))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(body["display_mode"], "default");
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["banners"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn home_custom_mode_keeps_the_configured_order() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let first = app.seed_product("Produto Um", 10.0, 10).await;
    let second = app.seed_product("Produto Dois", 10.0, 10).await;
    let third = app.seed_product("Produto Tres", 10.0, 10).await;

    let response = app
        .client
        .put(format!("{}/api/admin/settings", app.address))
        .bearer_auth(&admin)
        .json(&serde_json::json!({
            "settings": {
                "home_display_mode": "custom",
                "home_product_ids": format!("{third},{first},{second}"),
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = app
        .client
        .get(format!("{}/api/home", app.address))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(body["display_mode"], "custom");

    let shown: Vec<i32> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap() as i32)
        .collect();
    assert_eq!(shown, vec![third, first, second]);
}

#[tokio::test]
async fn home_falls_back_to_default_when_the_selection_is_empty() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    app.seed_product("Produto Um", 10.0, 10).await;

    let response = app
        .client
        .put(format!("{}/api/admin/settings", app.address))
        .bearer_auth(&admin)
        .json(&serde_json::json!({
            "settings": {
                "home_display_mode": "custom",
                "home_product_ids": "",
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = app
        .client
        .get(format!("{}/api/home", app.address))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_display_modes_are_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app
        .client
        .put(format!("{}/api/admin/settings", app.address))
        .bearer_auth(&admin)
        .json(&serde_json::json!({
            "settings": { "home_display_mode": "carousel" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_sold_product_only_deactivates_it() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let token = app.register_and_login("comprou@test.local").await;
    let flyer = app.seed_product("Flyer Vendido", 10.0, 5).await;
    app.add_to_cart(&token, flyer, 1).await;

    let response = app
        .client
        .post(format!("{}/api/cart/checkout", app.address))
        .bearer_auth(&token)
        .json(&common::checkout_body())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let response = app
        .client
        .delete(format!("{}/api/admin/product/{}", app.address, flyer))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["message"], "Product deactivated");

    // Gone from the storefront, still present for the back office.
    let response = app
        .client
        .get(format!("{}/api/product/{}", app.address, flyer))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let response = app
        .client
        .get(format!("{}/api/admin/product/{}", app.address, flyer))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["status"], "inactive");
}

#[tokio::test]
async fn deleting_an_unsold_product_clears_it_from_carts() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let token = app.register_and_login("quase-comprou@test.local").await;
    let flyer = app.seed_product("Flyer Encalhado", 10.0, 5).await;
    app.add_to_cart(&token, flyer, 2).await;

    let response = app
        .client
        .delete(format!("{}/api/admin/product/{}", app.address, flyer))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["message"], "Resource deleted successfully.");

    // The cart entry went with the product, so checkout no longer trips
    // over a missing reference.
    let body = app
        .client
        .get(format!("{}/api/cart", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    let response = app
        .client
        .post(format!("{}/api/cart/checkout", app.address))
        .bearer_auth(&token)
        .json(&common::checkout_body())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["error"], "Cart is empty");
}
