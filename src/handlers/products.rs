//! Product catalog CRUD. Writes are admin-only; listings only show active
//! products. Delete is a soft deactivate so order history keeps its references.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminSession;
use crate::error::{AppError, AppResult};
use crate::models::Product;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

// Widen before multiplying; page and per_page come straight from the query
// string and their product can exceed u32.
pub(crate) fn page_offset(page: u32, per_page: u32) -> i64 {
    (page as i64 - 1) * per_page as i64
}

pub async fn list(State(s): State<AppState>, Query(p): Query<ListParams>) -> AppResult<Json<PaginatedResponse<Product>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let search = p.search.as_deref().unwrap_or("").trim().to_string();
    let pattern = format!("%{}%", search);

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE active \
         AND ($1::uuid IS NULL OR category_id = $1) \
         AND ($2 = '' OR name ILIKE $3 OR sku ILIKE $3) \
         ORDER BY created_at DESC LIMIT $4 OFFSET $5",
    )
    .bind(p.category)
    .bind(&search)
    .bind(&pattern)
    .bind(per_page as i64)
    .bind(page_offset(page, per_page))
    .fetch_all(&s.db)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE active \
         AND ($1::uuid IS NULL OR category_id = $1) \
         AND ($2 = '' OR name ILIKE $3 OR sku ILIKE $3)",
    )
    .bind(p.category)
    .bind(&search)
    .bind(&pattern)
    .fetch_one(&s.db)
    .await?;

    Ok(Json(PaginatedResponse { data: products, total: total.0, page }))
}

pub async fn get_one(State(s): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("produk".into()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    pub weight_grams: Option<i32>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
}

pub async fn create(_admin: AdminSession, State(s): State<AppState>, Json(r): Json<ProductRequest>) -> AppResult<(StatusCode, Json<Product>)> {
    r.validate()?;
    let id = Uuid::new_v4();
    let sku = format!("PRD-{}", &id.simple().to_string()[..8].to_uppercase());
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, sku, name, description, price, weight_grams, stock, active, category_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8) RETURNING *",
    )
    .bind(id)
    .bind(&sku)
    .bind(r.name.trim())
    .bind(&r.description)
    .bind(r.price)
    .bind(r.weight_grams.unwrap_or(0))
    .bind(r.stock.unwrap_or(0))
    .bind(r.category_id)
    .fetch_one(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(_admin: AdminSession, State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<ProductRequest>) -> AppResult<Json<Product>> {
    r.validate()?;
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET name = $2, description = $3, price = $4, weight_grams = $5, stock = $6, category_id = $7, updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(r.name.trim())
    .bind(&r.description)
    .bind(r.price)
    .bind(r.weight_grams.unwrap_or(0))
    .bind(r.stock.unwrap_or(0))
    .bind(r.category_id)
    .fetch_optional(&s.db)
    .await?
    .ok_or_else(|| AppError::NotFound("produk".into()))?;
    Ok(Json(product))
}

pub async fn deactivate(_admin: AdminSession, State(s): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    let affected = sqlx::query("UPDATE products SET active = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?
        .rows_affected();
    if affected == 0 {
        return Err(AppError::NotFound("produk".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::page_offset;

    #[test]
    fn test_page_offset_basics() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    #[allow(arithmetic_overflow)]
    fn test_page_offset_survives_huge_query_params() {
        // u32::MAX * u32::MAX would wrap in 32-bit arithmetic.
        assert_eq!(
            page_offset(u32::MAX, u32::MAX),
            (u32::MAX as i64 - 1) * u32::MAX as i64
        );
    }
}
