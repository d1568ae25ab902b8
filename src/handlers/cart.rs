//! Shopping cart, one per authenticated user.
//!
//! The unit price is snapshotted when a line is added and is what checkout
//! charges, even if the catalog price changes afterwards. Only stock gets
//! re-validated at checkout.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::{AppError, AppResult};
use crate::models::{CartLine, Product};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: i64,
}

async fn load_lines(db: &PgPool, user_id: Uuid) -> Result<Vec<CartLine>, sqlx::Error> {
    sqlx::query_as::<_, CartLine>(
        "SELECT ci.id, ci.product_id, p.name, ci.quantity, ci.price_snapshot, ci.added_at \
         FROM cart_items ci \
         JOIN carts c ON ci.cart_id = c.id \
         JOIN products p ON ci.product_id = p.id \
         WHERE c.user_id = $1 ORDER BY ci.added_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

fn view(items: Vec<CartLine>) -> CartView {
    let subtotal = items.iter().map(|i| i.price_snapshot * i.quantity as i64).sum();
    CartView { items, subtotal }
}

pub async fn get_cart(session: Session, State(s): State<AppState>) -> AppResult<Json<CartView>> {
    Ok(Json(view(load_lines(&s.db, session.user_id).await?)))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub async fn add_item(session: Session, State(s): State<AppState>, Json(r): Json<AddItemRequest>) -> AppResult<(StatusCode, Json<CartView>)> {
    if r.quantity <= 0 {
        return Err(AppError::Validation("quantity harus lebih dari 0".into()));
    }
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND active")
        .bind(r.product_id)
        .fetch_optional(&s.db)
        .await?
        .ok_or_else(|| AppError::BusinessRule("Produk tidak tersedia".into()))?;

    // Cart row is created on first add and survives checkout (only its items
    // are cleared).
    let (cart_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO carts (id, user_id) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(session.user_id)
    .fetch_one(&s.db)
    .await?;

    // Merging an existing line keeps the original price snapshot.
    sqlx::query(
        "INSERT INTO cart_items (id, cart_id, product_id, quantity, price_snapshot) VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
    )
    .bind(Uuid::new_v4())
    .bind(cart_id)
    .bind(product.id)
    .bind(r.quantity)
    .bind(product.price)
    .execute(&s.db)
    .await?;

    Ok((StatusCode::CREATED, Json(view(load_lines(&s.db, session.user_id).await?))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

pub async fn update_item(session: Session, State(s): State<AppState>, Path(product_id): Path<Uuid>, Json(r): Json<UpdateItemRequest>) -> AppResult<Json<CartView>> {
    if r.quantity < 0 {
        return Err(AppError::Validation("quantity tidak boleh negatif".into()));
    }
    let affected = if r.quantity == 0 {
        sqlx::query("DELETE FROM cart_items ci USING carts c WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2")
            .bind(session.user_id)
            .bind(product_id)
            .execute(&s.db)
            .await?
            .rows_affected()
    } else {
        sqlx::query("UPDATE cart_items ci SET quantity = $3 FROM carts c WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2")
            .bind(session.user_id)
            .bind(product_id)
            .bind(r.quantity)
            .execute(&s.db)
            .await?
            .rows_affected()
    };
    if affected == 0 {
        return Err(AppError::NotFound("item keranjang".into()));
    }
    Ok(Json(view(load_lines(&s.db, session.user_id).await?)))
}

pub async fn remove_item(session: Session, State(s): State<AppState>, Path(product_id): Path<Uuid>) -> AppResult<Json<CartView>> {
    let affected = sqlx::query("DELETE FROM cart_items ci USING carts c WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2")
        .bind(session.user_id)
        .bind(product_id)
        .execute(&s.db)
        .await?
        .rows_affected();
    if affected == 0 {
        return Err(AppError::NotFound("item keranjang".into()));
    }
    Ok(Json(view(load_lines(&s.db, session.user_id).await?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(qty: i32, price: i64) -> CartLine {
        CartLine {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            name: "Tinta Epson 664".into(),
            quantity: qty,
            price_snapshot: price,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_subtotal_is_sum_of_snapshots() {
        let v = view(vec![line(2, 85_000), line(1, 1_250_000)]);
        assert_eq!(v.subtotal, 2 * 85_000 + 1_250_000);
    }

    #[test]
    fn test_empty_cart_subtotal_zero() {
        assert_eq!(view(vec![]).subtotal, 0);
    }
}
