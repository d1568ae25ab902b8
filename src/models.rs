//! Database row types shared by the handler layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid, pub username: String, #[serde(skip_serializing)] pub password_hash: String,
    pub name: String, pub role: String, pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid, pub sku: String, pub name: String, pub description: Option<String>,
    pub price: i64, pub weight_grams: i32, pub stock: i32, pub active: bool,
    pub category_id: Option<Uuid>, pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category { pub id: Uuid, pub name: String, pub slug: String, pub created_at: DateTime<Utc> }

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: Uuid, pub product_id: Uuid, pub name: String, pub quantity: i32,
    pub price_snapshot: i64, pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid, pub code: String, pub user_id: Uuid,
    pub subtotal: i64, pub shipping_cost: i64, pub total: i64,
    pub shipping_address: String, pub payment_method: String, pub status: String,
    pub courier: Option<String>, pub tracking_number: Option<String>,
    pub paid_at: Option<DateTime<Utc>>, pub confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>, pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid, pub order_id: Uuid, pub product_id: Uuid, pub name: String,
    pub price: i64, pub weight_grams: i32, pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalesTransaction {
    pub id: Uuid, pub code: String, pub cashier_id: Uuid,
    pub total: i64, pub amount_paid: i64, pub change_given: i64, pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalesItem {
    pub id: Uuid, pub transaction_id: Uuid, pub product_id: Uuid, pub name: String,
    pub price: i64, pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceRequest {
    pub id: Uuid, pub code: String, pub device_type: String, pub complaint: String,
    pub customer_name: String, pub phone: String, pub address: Option<String>,
    pub priority: String, pub sla_target: DateTime<Utc>, pub sla_status: String,
    pub status: String, pub created_at: DateTime<Utc>, pub updated_at: DateTime<Utc>,
}
