//! Stock Ledger
//!
//! The single place product stock is decremented. Both the checkout path and
//! the POS sale path reserve through here; the conditional write is the only
//! concurrency-control primitive, so a read that showed enough stock can still
//! lose the race and must be treated as insufficient.

use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved,
    InsufficientStock,
    NotFound,
}

/// Atomically decrement `stock` by `qty` iff enough remains.
///
/// Callers are expected to run this inside the surrounding checkout/sale
/// transaction so a failed line rolls back earlier reservations too.
pub async fn reserve(conn: &mut PgConnection, product_id: Uuid, qty: i32) -> Result<ReserveOutcome, sqlx::Error> {
    let affected = sqlx::query("UPDATE products SET stock = stock - $1, updated_at = NOW() WHERE id = $2 AND stock >= $1")
        .bind(qty)
        .bind(product_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if affected == 1 {
        return Ok(ReserveOutcome::Reserved);
    }
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(match exists {
        Some(_) => ReserveOutcome::InsufficientStock,
        None => ReserveOutcome::NotFound,
    })
}

/// Return previously reserved units, e.g. when an admin cancels an order.
pub async fn release(conn: &mut PgConnection, product_id: Uuid, qty: i32) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET stock = stock + $1, updated_at = NOW() WHERE id = $2")
        .bind(qty)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}
