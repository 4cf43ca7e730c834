pub mod banner;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod consent_log;
pub mod home_section;
pub mod order;
pub mod order_item;
pub mod product;
pub mod site_setting;
pub mod user;
pub mod user_address;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DatabaseConnection, Schema, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Soft-delete status carried by the content entities. Read paths filter on
/// `Active`; rows are flipped to `Inactive` instead of being removed once
/// anything references them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    enum_name = "entity_status",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
pub enum EntityStatus {
    #[sea_orm(string_value = "active")]
    #[serde(rename = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    #[serde(rename = "inactive")]
    Inactive,
}

pub async fn setup_schema(db: &DatabaseConnection) {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    macro_rules! create_table {
        ($entity:expr, $what:literal) => {
            let mut stmt = schema.create_table_from_entity($entity);
            stmt.if_not_exists();
            db.execute(backend.build(&stmt))
                .await
                .expect(concat!("Failed to create ", $what, " schema"));
        };
    }

    create_table!(user::Entity, "users");
    create_table!(consent_log::Entity, "consent_logs");
    create_table!(category::Entity, "categories");
    create_table!(product::Entity, "products");
    create_table!(cart::Entity, "carts");
    create_table!(cart_item::Entity, "cart_items");
    create_table!(order::Entity, "orders");
    create_table!(order_item::Entity, "order_items");
    create_table!(user_address::Entity, "user_addresses");
    create_table!(banner::Entity, "banners");
    create_table!(home_section::Entity, "home_sections");
    create_table!(site_setting::Entity, "site_settings");
}

/// Seeds the back-office admin account and the homepage settings keys on
/// first start. Safe to call again: existing rows are left alone.
pub async fn primary_setup(db: Arc<DatabaseConnection>) {
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@grafica.local".to_owned());

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&*admin_email))
        .one(&*db)
        .await
        .expect("Failed to query users during primary setup");

    if existing.is_none() {
        let admin_password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "grafica-admin".to_owned());

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(admin_password.as_bytes(), &salt)
            .expect("Failed to hash admin password")
            .to_string();

        let new_admin = user::ActiveModel {
            email: Set(admin_email),
            password: Set(password_hash),
            name: Set("Administrador".to_owned()),
            role: Set(user::Role::Admin),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        user::Entity::insert(new_admin)
            .exec(&*db)
            .await
            .expect("Failed to seed admin user");
    }

    for (key, value) in [
        ("home_display_mode", "default"),
        ("home_category_id", ""),
        ("home_product_ids", ""),
        ("logo_path", ""),
    ] {
        let found = site_setting::Entity::find()
            .filter(site_setting::Column::SettingKey.eq(key))
            .one(&*db)
            .await
            .expect("Failed to query site settings during primary setup");
        if found.is_none() {
            let row = site_setting::ActiveModel {
                setting_key: Set(key.to_owned()),
                setting_value: Set(value.to_owned()),
                ..Default::default()
            };
            site_setting::Entity::insert(row)
                .exec(&*db)
                .await
                .expect("Failed to seed site settings");
        }
    }
}
