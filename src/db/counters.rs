//! Durable per-(prefix, year) sequence counter for document codes.
//!
//! A single atomic upsert replaces the original time-derived sequence, which
//! could collide under load and reset across restarts.

use sqlx::PgConnection;

pub async fn next_sequence(conn: &mut PgConnection, prefix: &str, year: i32) -> Result<i64, sqlx::Error> {
    let (value,): (i64,) = sqlx::query_as(
        "INSERT INTO order_counters (prefix, year, last_value) VALUES ($1, $2, 1) \
         ON CONFLICT (prefix, year) DO UPDATE SET last_value = order_counters.last_value + 1 \
         RETURNING last_value",
    )
    .bind(prefix)
    .bind(year)
    .fetch_one(conn)
    .await?;
    Ok(value)
}
