/// Env-driven configuration with hardcoded fallbacks for local development.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub mp_base_url: String,
    pub mp_access_token: String,
    pub upload_dir: String,
    pub product_upload_dir: String,
    pub frontend_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        AppConfig {
            database_url: env_or("DATABASE_URL", "sqlite://grafica.db?mode=rwc"),
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            mp_base_url: env_or("MP_BASE_URL", "https://api.mercadopago.com"),
            mp_access_token: env_or("MP_ACCESS_TOKEN", "TEST-local-token"),
            upload_dir: env_or("UPLOAD_DIR", "./uploads"),
            product_upload_dir: env_or("PRODUCT_UPLOAD_DIR", "./uploads/products"),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:5173"),
        }
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_owned())
}
