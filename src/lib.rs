//! Toko Print backend
//!
//! E-commerce storefront, point-of-sale register and service-desk backend for
//! a printer/computer retail business.
//!
//! ## Features
//! - Product catalog and shopping cart
//! - Checkout with atomic stock reservation
//! - POS walk-in sales sharing the same stock ledger
//! - Service tickets with SLA targets
//! - Sales and service reporting

pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod models;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
}

pub use error::{AppError, AppResult};
