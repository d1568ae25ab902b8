//! HTTP surface: route table and request handlers.

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod pos;
pub mod products;
pub mod reports;
pub mod service;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "tokoprint"})) }))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/products", get(products::list).post(products::create))
        .route("/api/v1/products/:id", get(products::get_one).put(products::update).delete(products::deactivate))
        .route("/api/v1/categories", get(categories::list).post(categories::create))
        .route("/api/v1/cart", get(cart::get_cart))
        .route("/api/v1/cart/items", post(cart::add_item))
        .route("/api/v1/cart/items/:product_id", axum::routing::put(cart::update_item).delete(cart::remove_item))
        .route("/api/v1/orders", get(orders::list).post(orders::checkout))
        .route("/api/v1/orders/:id", get(orders::get_one).put(orders::admin_update))
        .route("/api/v1/pos/sales", get(pos::list).post(pos::create_sale))
        .route("/api/v1/service-requests", get(service::list).post(service::create))
        .route("/api/v1/service-requests/:id", get(service::get_one).put(service::admin_update))
        .route("/api/v1/service-requests/code/:code", get(service::track_by_code))
        .route("/api/v1/reports/summary", get(reports::summary))
        .route("/api/v1/reports/daily", get(reports::daily))
        .route("/api/v1/reports/top-products", get(reports::top_products))
        .route("/api/v1/reports/service", get(reports::service_summary))
        .route("/api/v1/reports/sales/print", get(reports::sales_print))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
