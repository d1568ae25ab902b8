//! Database-backed tests for the checkout/stock invariants.
//!
//! These need a running Postgres reachable through `DATABASE_URL`; each test
//! gets its own schema via `#[sqlx::test]` with the crate's migrations.
//! Run them explicitly with `cargo test -- --ignored`.

use axum::extract::{Path, Query, State};
use axum::Json;
use sqlx::PgPool;
use uuid::Uuid;

use tokoprint::auth::{AdminSession, Role, Session};
use tokoprint::handlers::orders::{self, AdminUpdateRequest, CheckoutRequest};
use tokoprint::handlers::reports::{self, RangeParams};
use tokoprint::{AppError, AppState};

async fn seed_user(pool: &PgPool, role: Role) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, username, password_hash, name, role) VALUES ($1, $2, 'x', 'Test', $3)")
        .bind(id)
        .bind(format!("user-{}", id.simple()))
        .bind(role.as_str())
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn seed_product(pool: &PgPool, stock: i32, price: i64) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO products (id, sku, name, price, stock, active) VALUES ($1, $2, $3, $4, $5, TRUE)")
        .bind(id)
        .bind(format!("SKU-{}", id.simple()))
        .bind(format!("Produk {}", id.simple()))
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn seed_cart(pool: &PgPool, user_id: Uuid, lines: &[(Uuid, i32, i64)]) {
    let cart_id = Uuid::new_v4();
    sqlx::query("INSERT INTO carts (id, user_id) VALUES ($1, $2)")
        .bind(cart_id)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
    for (product_id, qty, price) in lines {
        sqlx::query("INSERT INTO cart_items (id, cart_id, product_id, quantity, price_snapshot) VALUES ($1, $2, $3, $4, $5)")
            .bind(Uuid::new_v4())
            .bind(cart_id)
            .bind(product_id)
            .bind(qty)
            .bind(price)
            .execute(pool)
            .await
            .unwrap();
    }
}

async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap();
    stock
}

async fn cart_len(pool: &PgPool, user_id: Uuid) -> i64 {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM cart_items ci JOIN carts c ON ci.cart_id = c.id WHERE c.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap();
    n
}

fn customer(user_id: Uuid) -> Session {
    Session { user_id, role: Role::Customer }
}

fn checkout_req() -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: "Jl. Mawar 1, Surabaya".into(),
        payment_method: "transfer".into(),
        shipping_cost: 10_000,
    }
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at a running Postgres"]
async fn checkout_clears_cart_and_decrements_stock(pool: PgPool) {
    let state = AppState { db: pool.clone() };
    let user = seed_user(&pool, Role::Customer).await;
    let product = seed_product(&pool, 5, 85_000).await;
    seed_cart(&pool, user, &[(product, 2, 85_000)]).await;

    let (_, Json(view)) = orders::checkout(customer(user), State(state), Json(checkout_req()))
        .await
        .unwrap();

    assert_eq!(view.order.subtotal, 2 * 85_000);
    assert_eq!(view.order.total, view.order.subtotal + view.order.shipping_cost);
    assert_eq!(stock_of(&pool, product).await, 3);
    assert_eq!(cart_len(&pool, user).await, 0);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at a running Postgres"]
async fn insufficient_stock_aborts_without_side_effects(pool: PgPool) {
    let state = AppState { db: pool.clone() };
    let user = seed_user(&pool, Role::Customer).await;
    let product = seed_product(&pool, 5, 85_000).await;
    seed_cart(&pool, user, &[(product, 8, 85_000)]).await;

    let err = orders::checkout(customer(user), State(state), Json(checkout_req()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BusinessRule(_)), "got {:?}", err);
    assert_eq!(stock_of(&pool, product).await, 5);
    assert_eq!(cart_len(&pool, user).await, 1);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at a running Postgres"]
async fn failed_line_rolls_back_earlier_reservations(pool: PgPool) {
    let state = AppState { db: pool.clone() };
    let user = seed_user(&pool, Role::Customer).await;
    let plenty = seed_product(&pool, 10, 50_000).await;
    let scarce = seed_product(&pool, 1, 90_000).await;
    seed_cart(&pool, user, &[(plenty, 2, 50_000), (scarce, 3, 90_000)]).await;

    let err = orders::checkout(customer(user), State(state), Json(checkout_req()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BusinessRule(_)));
    // The transaction rollback undoes any reservation made for the first line.
    assert_eq!(stock_of(&pool, plenty).await, 10);
    assert_eq!(stock_of(&pool, scarce).await, 1);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at a running Postgres"]
async fn concurrent_checkouts_never_oversell(pool: PgPool) {
    let state = AppState { db: pool.clone() };
    let buyer_a = seed_user(&pool, Role::Customer).await;
    let buyer_b = seed_user(&pool, Role::Customer).await;
    let product = seed_product(&pool, 5, 85_000).await;
    seed_cart(&pool, buyer_a, &[(product, 3, 85_000)]).await;
    seed_cart(&pool, buyer_b, &[(product, 3, 85_000)]).await;

    let (a, b) = tokio::join!(
        orders::checkout(customer(buyer_a), State(state.clone()), Json(checkout_req())),
        orders::checkout(customer(buyer_b), State(state), Json(checkout_req())),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one buyer may win the last units");
    let loser = if a.is_ok() { b.unwrap_err() } else { a.unwrap_err() };
    assert!(matches!(loser, AppError::BusinessRule(_)), "got {:?}", loser);
    assert_eq!(stock_of(&pool, product).await, 2);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at a running Postgres"]
async fn opposite_order_carts_both_complete(pool: PgPool) {
    let state = AppState { db: pool.clone() };
    let buyer_a = seed_user(&pool, Role::Customer).await;
    let buyer_b = seed_user(&pool, Role::Customer).await;
    let p1 = seed_product(&pool, 10, 40_000).await;
    let p2 = seed_product(&pool, 10, 60_000).await;
    // Lines added in opposite order; reservation sorts by product_id, so the
    // two transactions take row locks in the same order and cannot deadlock.
    seed_cart(&pool, buyer_a, &[(p1, 1, 40_000), (p2, 1, 60_000)]).await;
    seed_cart(&pool, buyer_b, &[(p2, 1, 60_000), (p1, 1, 40_000)]).await;

    let (a, b) = tokio::join!(
        orders::checkout(customer(buyer_a), State(state.clone()), Json(checkout_req())),
        orders::checkout(customer(buyer_b), State(state), Json(checkout_req())),
    );

    assert!(a.is_ok(), "buyer A failed: {:?}", a.err());
    assert!(b.is_ok(), "buyer B failed: {:?}", b.err());
    assert_eq!(stock_of(&pool, p1).await, 8);
    assert_eq!(stock_of(&pool, p2).await, 8);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at a running Postgres"]
async fn payment_rejection_restocks_reserved_units(pool: PgPool) {
    let state = AppState { db: pool.clone() };
    let admin = seed_user(&pool, Role::Admin).await;
    let user = seed_user(&pool, Role::Customer).await;
    let product = seed_product(&pool, 5, 85_000).await;
    seed_cart(&pool, user, &[(product, 2, 85_000)]).await;

    let (_, Json(view)) = orders::checkout(customer(user), State(state.clone()), Json(checkout_req()))
        .await
        .unwrap();
    assert_eq!(stock_of(&pool, product).await, 3);

    let admin_session = AdminSession(Session { user_id: admin, role: Role::Admin });
    let Json(updated) = orders::admin_update(
        admin_session,
        State(state),
        Path(view.order.id),
        Json(AdminUpdateRequest { status: "payment_rejected".into(), tracking_number: None, courier: None }),
    )
    .await
    .unwrap();

    assert_eq!(updated.status, "payment_rejected");
    assert_eq!(stock_of(&pool, product).await, 5);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at a running Postgres"]
async fn summary_report_is_idempotent(pool: PgPool) {
    let state = AppState { db: pool.clone() };
    let admin = seed_user(&pool, Role::Admin).await;
    let user = seed_user(&pool, Role::Customer).await;
    let product = seed_product(&pool, 5, 85_000).await;
    seed_cart(&pool, user, &[(product, 2, 85_000)]).await;
    orders::checkout(customer(user), State(state.clone()), Json(checkout_req()))
        .await
        .unwrap();

    let range = RangeParams { start_date: None, end_date: None };
    let admin_session = || AdminSession(Session { user_id: admin, role: Role::Admin });
    let Json(first) = reports::summary(admin_session(), State(state.clone()), Query(range)).await.unwrap();
    let Json(second) = reports::summary(admin_session(), State(state), Query(range)).await.unwrap();

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
    assert_eq!(first.combined.revenue, 2 * 85_000 + 10_000);
}
