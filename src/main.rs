use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

use grafica_store::api::create_api_router;
use grafica_store::config::AppConfig;
use grafica_store::entities::{primary_setup, setup_schema};
use grafica_store::payments::PaymentGateway;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env();

    let db: DatabaseConnection = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    setup_schema(&db).await;

    let shared_db = Arc::new(db);
    primary_setup(shared_db.clone()).await;

    let gateway = Arc::new(PaymentGateway::new(&config));
    let config = Arc::new(config);

    let app = create_api_router(shared_db, gateway, config.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Running at {:?}", listener.local_addr());
    axum::serve(listener, app).await.expect("Server stopped");
}
