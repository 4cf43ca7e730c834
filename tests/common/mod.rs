#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;
use tokio::net::TcpListener;

use grafica_store::api::create_api_router;
use grafica_store::config::AppConfig;
use grafica_store::entities::{primary_setup, product, setup_schema, EntityStatus};
use grafica_store::payments::PaymentGateway;

pub struct TestApp {
    pub address: String,
    pub db: Arc<DatabaseConnection>,
    pub client: Client,
}

/// Boots the whole API against a fresh in-memory database on an ephemeral
/// port. One connection only, so every request sees the same database.
/// Provider calls go to a closed port and fail fast.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_provider("http://127.0.0.1:9").await
}

/// Same as `spawn_app`, with the payment gateway pointed at a caller-chosen
/// base URL (a stub provider, usually).
pub async fn spawn_app_with_provider(provider_url: &str) -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open the in-memory database");
    setup_schema(&db).await;

    let db = Arc::new(db);
    primary_setup(db.clone()).await;

    let config = Arc::new(test_config(provider_url));
    let gateway = Arc::new(PaymentGateway::new(&config));
    let router = create_api_router(db.clone(), gateway, config);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind the test listener");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Listener has no local addr")
    );
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server stopped");
    });

    TestApp {
        address,
        db,
        client: Client::new(),
    }
}

fn test_config(provider_url: &str) -> AppConfig {
    let scratch = std::env::temp_dir().join(format!("grafica-test-{}", uuid::Uuid::new_v4()));
    AppConfig {
        database_url: "sqlite::memory:".to_owned(),
        bind_addr: "127.0.0.1:0".to_owned(),
        mp_base_url: provider_url.to_owned(),
        mp_access_token: "TEST-token".to_owned(),
        upload_dir: scratch.join("uploads").to_string_lossy().into_owned(),
        product_upload_dir: scratch
            .join("uploads/products")
            .to_string_lossy()
            .into_owned(),
        frontend_url: "http://localhost:5173".to_owned(),
    }
}

impl TestApp {
    pub async fn register_and_login(&self, email: &str) -> String {
        let response = self
            .client
            .post(format!("{}/api/register", self.address))
            .json(&serde_json::json!({
                "name": "Cliente Teste",
                "email": email,
                "password": "senha-segura-123",
            }))
            .send()
            .await
            .expect("Failed to send register request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        self.login(email, "senha-segura-123").await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(format!("{}/api/login", self.address))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to send login request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body = response
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse login response");
        body["token"]
            .as_str()
            .expect("Login response carries no token")
            .to_owned()
    }

    /// The back-office account seeded by `primary_setup`.
    pub async fn admin_token(&self) -> String {
        self.login("admin@grafica.local", "grafica-admin").await
    }

    pub async fn seed_product(&self, name: &str, price: f32, stock: i32) -> i32 {
        let model = product::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(format!("{name} de teste")),
            price: Set(price),
            promo_price: Set(None),
            is_promo: Set(false),
            stock: Set(stock),
            category_id: Set(None),
            main_image: Set(None),
            secondary_images: Set(product::ImageList::default()),
            options: Set(product::OptionSchema::default()),
            status: Set(EntityStatus::Active),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        product::Entity::insert(model)
            .exec(&*self.db)
            .await
            .expect("Failed to seed product")
            .last_insert_id
    }

    pub async fn add_to_cart(&self, token: &str, product_id: i32, quantity: i32) {
        let response = self
            .client
            .post(format!("{}/api/cart", self.address))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "product_id": product_id,
                "quantity": quantity,
            }))
            .send()
            .await
            .expect("Failed to send add-to-cart request");
        assert!(
            response.status().is_success(),
            "add_to_cart failed: {}",
            response.status()
        );
    }
}

/// Checkout payload with a complete shipping address.
pub fn checkout_body() -> serde_json::Value {
    serde_json::json!({
        "payment_method": "pix",
        "address_data": {
            "street": "Rua das Palmeiras",
            "number": "120",
            "complement": "sala 3",
            "district": "Centro",
            "city": "Campinas",
            "state": "SP",
            "postal_code": "13010-000",
        }
    })
}
