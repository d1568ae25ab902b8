//! Point-of-sale walk-in sales.
//!
//! No cart: items come straight from the register and are validated and
//! reserved in one transactional pass through the same stock ledger the
//! online checkout uses. The price snapshot is the live product price at
//! sale time.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::StaffSession;
use crate::db::{counters, stock};
use crate::db::stock::ReserveOutcome;
use crate::domain::codes;
use crate::error::{AppError, AppResult};
use crate::handlers::products::{page_offset, ListParams, PaginatedResponse};
use crate::models::{Product, SalesItem, SalesTransaction};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SaleView {
    #[serde(flatten)]
    pub sale: SalesTransaction,
    pub items: Vec<SalesItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub items: Vec<SaleLineRequest>,
    pub amount_paid: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub async fn create_sale(staff: StaffSession, State(s): State<AppState>, Json(r): Json<SaleRequest>) -> AppResult<(StatusCode, Json<SaleView>)> {
    if r.items.is_empty() {
        return Err(AppError::BusinessRule("Keranjang kosong".into()));
    }
    if r.items.iter().any(|i| i.quantity <= 0) {
        return Err(AppError::Validation("quantity harus lebih dari 0".into()));
    }

    // Same lock-ordering rule as checkout: reserve in ascending product_id so
    // concurrent sales cannot deadlock each other.
    let amount_paid = r.amount_paid;
    let mut lines = r.items;
    lines.sort_by_key(|i| i.product_id);

    let mut tx = s.db.begin().await?;

    let mut total: i64 = 0;
    let mut priced = Vec::with_capacity(lines.len());
    for line in &lines {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND active")
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::BusinessRule(format!("Produk id {} tidak ditemukan", line.product_id)))?;
        match stock::reserve(&mut *tx, product.id, line.quantity).await? {
            ReserveOutcome::Reserved => {}
            ReserveOutcome::InsufficientStock => {
                return Err(AppError::BusinessRule(format!("Stok tidak cukup untuk {}", product.name)));
            }
            ReserveOutcome::NotFound => {
                return Err(AppError::BusinessRule(format!("Produk id {} tidak ditemukan", line.product_id)));
            }
        }
        total += product.price * line.quantity as i64;
        priced.push((product, line.quantity));
    }

    if amount_paid < total {
        return Err(AppError::BusinessRule("Uang bayar tidak cukup".into()));
    }

    let now = Utc::now();
    let seq = counters::next_sequence(&mut *tx, codes::POS_PREFIX, codes::current_year(now)).await?;
    let code = codes::document_code(codes::POS_PREFIX, codes::current_year(now), seq);

    let sale = sqlx::query_as::<_, SalesTransaction>(
        "INSERT INTO sales_transactions (id, code, cashier_id, total, amount_paid, change_given) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&code)
    .bind(staff.0.user_id)
    .bind(total)
    .bind(amount_paid)
    .bind(amount_paid - total)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    for (product, quantity) in &priced {
        let item = sqlx::query_as::<_, SalesItem>(
            "INSERT INTO sales_items (id, transaction_id, product_id, name, price, quantity) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(sale.id)
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;
        items.push(item);
    }

    tx.commit().await?;
    tracing::info!(code = %sale.code, total = sale.total, "pos sale recorded");
    Ok((StatusCode::CREATED, Json(SaleView { sale, items })))
}

pub async fn list(_staff: StaffSession, State(s): State<AppState>, Query(p): Query<ListParams>) -> AppResult<Json<PaginatedResponse<SalesTransaction>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let sales = sqlx::query_as::<_, SalesTransaction>(
        "SELECT * FROM sales_transactions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(page_offset(page, per_page))
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales_transactions")
        .fetch_one(&s.db)
        .await?;
    Ok(Json(PaginatedResponse { data: sales, total: total.0, page }))
}
