//! Online orders: checkout (cart -> order) and the admin status lifecycle.
//!
//! Checkout runs as one database transaction: stock validation, atomic
//! per-line reservation, order persistence and cart clearing either all land
//! or none do. A reservation that loses the race with a concurrent buyer
//! rolls the whole order back, so no partial decrements ever survive.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AdminSession, Role, Session};
use crate::db::{counters, stock};
use crate::db::stock::ReserveOutcome;
use crate::domain::codes;
use crate::domain::status::OrderStatus;
use crate::error::{AppError, AppResult};
use crate::handlers::products::{page_offset, ListParams, PaginatedResponse};
use crate::models::{Order, OrderItem};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub payment_method: String,
    #[serde(default)]
    pub shipping_cost: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CheckoutLine {
    product_id: Uuid,
    quantity: i32,
    price_snapshot: i64,
    name: Option<String>,
    weight_grams: Option<i32>,
    active: Option<bool>,
    stock: Option<i32>,
}

pub async fn checkout(session: Session, State(s): State<AppState>, Json(r): Json<CheckoutRequest>) -> AppResult<(StatusCode, Json<OrderView>)> {
    if r.shipping_address.trim().is_empty() {
        return Err(AppError::Validation("Alamat pengiriman wajib diisi".into()));
    }
    if r.payment_method.trim().is_empty() {
        return Err(AppError::Validation("Metode pembayaran wajib diisi".into()));
    }
    if r.shipping_cost < 0 {
        return Err(AppError::Validation("Ongkir tidak boleh negatif".into()));
    }

    let mut tx = s.db.begin().await?;

    let lines = sqlx::query_as::<_, CheckoutLine>(
        "SELECT ci.product_id, ci.quantity, ci.price_snapshot, p.name, p.weight_grams, p.active, p.stock \
         FROM cart_items ci \
         JOIN carts c ON ci.cart_id = c.id \
         LEFT JOIN products p ON ci.product_id = p.id \
         WHERE c.user_id = $1 ORDER BY ci.product_id",
    )
    .bind(session.user_id)
    .fetch_all(&mut *tx)
    .await?;

    if lines.is_empty() {
        return Err(AppError::BusinessRule("Keranjang kosong".into()));
    }

    // Reservations run in ascending product_id so every concurrent checkout
    // takes row locks in the same order and cannot deadlock another one.
    for line in &lines {
        let name = line.name.as_deref().unwrap_or("(produk terhapus)");
        if line.name.is_none() || !line.active.unwrap_or(false) {
            return Err(AppError::BusinessRule(format!("Produk {} tidak tersedia lagi", name)));
        }
        if line.stock.unwrap_or(0) < line.quantity {
            return Err(AppError::BusinessRule(format!("Stok tidak cukup untuk {}", name)));
        }
        match stock::reserve(&mut *tx, line.product_id, line.quantity).await? {
            ReserveOutcome::Reserved => {}
            // The earlier read showed enough stock; a concurrent buyer won the
            // conditional write. Rolling back undoes this order's prior lines.
            ReserveOutcome::InsufficientStock => {
                tracing::warn!(product_id = %line.product_id, "stock reservation lost race");
                return Err(AppError::BusinessRule(format!("Stok tidak cukup untuk {}", name)));
            }
            ReserveOutcome::NotFound => {
                return Err(AppError::BusinessRule(format!("Produk {} tidak tersedia lagi", name)));
            }
        }
    }

    let subtotal: i64 = lines.iter().map(|l| l.price_snapshot * l.quantity as i64).sum();
    let total = subtotal + r.shipping_cost;

    let now = Utc::now();
    let seq = counters::next_sequence(&mut *tx, codes::ORDER_PREFIX, codes::current_year(now)).await?;
    let code = codes::document_code(codes::ORDER_PREFIX, codes::current_year(now), seq);

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, code, user_id, subtotal, shipping_cost, total, shipping_address, payment_method, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&code)
    .bind(session.user_id)
    .bind(subtotal)
    .bind(r.shipping_cost)
    .bind(total)
    .bind(r.shipping_address.trim())
    .bind(r.payment_method.trim())
    .bind(OrderStatus::Pending.as_str())
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (id, order_id, product_id, name, price, weight_grams, quantity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(line.product_id)
        .bind(line.name.as_deref().unwrap_or_default())
        .bind(line.price_snapshot)
        .bind(line.weight_grams.unwrap_or(0))
        .bind(line.quantity)
        .fetch_one(&mut *tx)
        .await?;
        items.push(item);
    }

    // Clear the items, keep the cart row.
    sqlx::query("DELETE FROM cart_items ci USING carts c WHERE ci.cart_id = c.id AND c.user_id = $1")
        .bind(session.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(code = %order.code, total = order.total, "order created");
    Ok((StatusCode::CREATED, Json(OrderView { order, items })))
}

pub async fn list(session: Session, State(s): State<AppState>, Query(p): Query<ListParams>) -> AppResult<Json<PaginatedResponse<Order>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    // Admins see every order, customers only their own.
    let scope_user = if session.role == Role::Admin { None } else { Some(session.user_id) };

    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(scope_user)
    .bind(per_page as i64)
    .bind(page_offset(page, per_page))
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE ($1::uuid IS NULL OR user_id = $1)")
        .bind(scope_user)
        .fetch_one(&s.db)
        .await?;
    Ok(Json(PaginatedResponse { data: orders, total: total.0, page }))
}

pub async fn get_one(session: Session, State(s): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<OrderView>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or_else(|| AppError::NotFound("order".into()))?;
    if session.role != Role::Admin && order.user_id != session.user_id {
        return Err(AppError::Forbidden("order milik pelanggan lain".into()));
    }
    let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(id)
        .fetch_all(&s.db)
        .await?;
    Ok(Json(OrderView { order, items }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub status: String,
    pub tracking_number: Option<String>,
    pub courier: Option<String>,
}

pub async fn admin_update(_admin: AdminSession, State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<AdminUpdateRequest>) -> AppResult<Json<Order>> {
    let next = OrderStatus::parse(&r.status)
        .ok_or_else(|| AppError::Validation(format!("status tidak dikenal: {}", r.status)))?;

    let mut tx = s.db.begin().await?;

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("order".into()))?;
    let current = OrderStatus::parse(&order.status)
        .ok_or_else(|| AppError::Internal(format!("status order korup: {}", order.status)))?;

    if !current.can_transition_to(next) {
        return Err(AppError::BusinessRule(format!(
            "Transisi status {} -> {} tidak diizinkan",
            current.as_str(),
            next.as_str()
        )));
    }

    // Both pre-shipment exits return the reserved units to the shelf; a
    // rejected payment must not keep the stock decremented forever.
    if matches!(next, OrderStatus::Cancelled | OrderStatus::PaymentRejected) {
        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        for item in &items {
            stock::release(&mut *tx, item.product_id, item.quantity).await?;
        }
    }

    let stamp_column = match next {
        OrderStatus::Paid => Some("paid_at"),
        OrderStatus::Confirmed => Some("confirmed_at"),
        OrderStatus::Shipped => Some("shipped_at"),
        OrderStatus::Delivered => Some("delivered_at"),
        OrderStatus::Cancelled => Some("cancelled_at"),
        _ => None,
    };
    let query = match stamp_column {
        Some(col) => format!(
            "UPDATE orders SET status = $2, courier = COALESCE($3, courier), tracking_number = COALESCE($4, tracking_number), {} = NOW(), updated_at = NOW() WHERE id = $1 RETURNING *",
            col
        ),
        None => "UPDATE orders SET status = $2, courier = COALESCE($3, courier), tracking_number = COALESCE($4, tracking_number), updated_at = NOW() WHERE id = $1 RETURNING *".to_string(),
    };
    let updated = sqlx::query_as::<_, Order>(&query)
        .bind(id)
        .bind(next.as_str())
        .bind(&r.courier)
        .bind(&r.tracking_number)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(code = %updated.code, from = current.as_str(), to = next.as_str(), "order status updated");
    Ok(Json(updated))
}
