mod common;

use common::{spawn_app, TestApp};

async fn create_address(
    app: &TestApp,
    token: &str,
    kind: &str,
    street: &str,
    is_default: bool,
) -> reqwest::StatusCode {
    app.client
        .post(format!("{}/api/address", app.address))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "kind": kind,
            "is_default": is_default,
            "street": street,
            "number": "100",
            "district": "Centro",
            "city": "Campinas",
            "state": "SP",
            "postal_code": "13010-000",
        }))
        .send()
        .await
        .expect("Failed to send create-address request")
        .status()
}

async fn list_addresses(app: &TestApp, token: &str) -> Vec<serde_json::Value> {
    app.client
        .get(format!("{}/api/address", app.address))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to list addresses")
        .json::<Vec<serde_json::Value>>()
        .await
        .expect("Failed to parse address list")
}

#[tokio::test]
async fn a_new_default_clears_the_previous_one_of_the_same_kind() {
    let app = spawn_app().await;
    let token = app.register_and_login("mudou@test.local").await;

    assert_eq!(
        create_address(&app, &token, "shipping", "Rua Antiga", true).await,
        reqwest::StatusCode::CREATED
    );
    assert_eq!(
        create_address(&app, &token, "shipping", "Rua Nova", true).await,
        reqwest::StatusCode::CREATED
    );

    let addresses = list_addresses(&app, &token).await;
    assert_eq!(addresses.len(), 2);

    let defaults: Vec<&serde_json::Value> = addresses
        .iter()
        .filter(|row| row["is_default"] == true)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["street"], "Rua Nova");
}

#[tokio::test]
async fn billing_default_does_not_touch_shipping_default() {
    let app = spawn_app().await;
    let token = app.register_and_login("dois-tipos@test.local").await;

    create_address(&app, &token, "shipping", "Rua de Entrega", true).await;
    create_address(&app, &token, "billing", "Rua de Cobranca", true).await;

    let addresses = list_addresses(&app, &token).await;
    let defaults: Vec<&serde_json::Value> = addresses
        .iter()
        .filter(|row| row["is_default"] == true)
        .collect();
    // One default per kind.
    assert_eq!(defaults.len(), 2);
}

#[tokio::test]
async fn patching_is_default_clears_the_sibling() {
    let app = spawn_app().await;
    let token = app.register_and_login("promovido@test.local").await;

    create_address(&app, &token, "shipping", "Rua Um", true).await;
    create_address(&app, &token, "shipping", "Rua Dois", false).await;

    let addresses = list_addresses(&app, &token).await;
    let second = addresses
        .iter()
        .find(|row| row["street"] == "Rua Dois")
        .unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let response = app
        .client
        .patch(format!("{}/api/address/{}", app.address, second_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "is_default": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let addresses = list_addresses(&app, &token).await;
    for row in &addresses {
        let expected = row["street"] == "Rua Dois";
        assert_eq!(row["is_default"] == true, expected);
    }
}

#[tokio::test]
async fn unknown_kind_and_blank_street_are_rejected() {
    let app = spawn_app().await;
    let token = app.register_and_login("descuidado@test.local").await;

    assert_eq!(
        create_address(&app, &token, "warehouse", "Rua Qualquer", false).await,
        reqwest::StatusCode::BAD_REQUEST
    );
    assert_eq!(
        create_address(&app, &token, "shipping", "", false).await,
        reqwest::StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn addresses_of_other_users_look_like_they_do_not_exist() {
    let app = spawn_app().await;
    let owner = app.register_and_login("titular@test.local").await;
    let intruder = app.register_and_login("curioso@test.local").await;

    create_address(&app, &owner, "shipping", "Rua Secreta", true).await;
    let owned = list_addresses(&app, &owner).await;
    let address_id = owned[0]["id"].as_i64().unwrap();

    for method in ["get", "patch", "delete"] {
        let url = format!("{}/api/address/{}", app.address, address_id);
        let request = match method {
            "get" => app.client.get(&url),
            "patch" => app
                .client
                .patch(&url)
                .json(&serde_json::json!({ "street": "Hackeada" })),
            _ => app.client.delete(&url),
        };
        let response = request.bearer_auth(&intruder).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
