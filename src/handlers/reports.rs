//! Read-only reporting over both sales channels.
//!
//! Orders are the online channel, sales_transactions the in-store channel;
//! the two collections are merged only at response shaping. Everything here
//! is derived data, safe to recompute at any time. Cancelled and
//! payment-rejected orders are excluded from revenue.

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AdminSession;
use crate::domain::sla::{self, SlaState};
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ChannelSummary {
    pub transaction_count: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub online: ChannelSummary,
    pub instore: ChannelSummary,
    pub combined: ChannelSummary,
}

async fn load_summary(db: &sqlx::PgPool, range: RangeParams) -> Result<SummaryReport, sqlx::Error> {
    let online = sqlx::query_as::<_, ChannelSummary>(
        "SELECT COUNT(*) AS transaction_count, COALESCE(SUM(total), 0)::bigint AS revenue \
         FROM orders WHERE status NOT IN ('cancelled', 'payment_rejected') \
         AND ($1::date IS NULL OR created_at::date >= $1) AND ($2::date IS NULL OR created_at::date <= $2)",
    )
    .bind(range.start_date)
    .bind(range.end_date)
    .fetch_one(db)
    .await?;

    let instore = sqlx::query_as::<_, ChannelSummary>(
        "SELECT COUNT(*) AS transaction_count, COALESCE(SUM(total), 0)::bigint AS revenue \
         FROM sales_transactions \
         WHERE ($1::date IS NULL OR created_at::date >= $1) AND ($2::date IS NULL OR created_at::date <= $2)",
    )
    .bind(range.start_date)
    .bind(range.end_date)
    .fetch_one(db)
    .await?;

    let combined = ChannelSummary {
        transaction_count: online.transaction_count + instore.transaction_count,
        revenue: online.revenue + instore.revenue,
    };
    Ok(SummaryReport { online, instore, combined })
}

pub async fn summary(_admin: AdminSession, State(s): State<AppState>, Query(range): Query<RangeParams>) -> AppResult<Json<SummaryReport>> {
    Ok(Json(load_summary(&s.db, range).await?))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailyPoint {
    pub day: NaiveDate,
    pub online_revenue: i64,
    pub instore_revenue: i64,
    pub revenue: i64,
    pub transaction_count: i64,
}

pub async fn daily(_admin: AdminSession, State(s): State<AppState>, Query(range): Query<RangeParams>) -> AppResult<Json<Vec<DailyPoint>>> {
    let points = sqlx::query_as::<_, DailyPoint>(
        "SELECT day, \
                COALESCE(SUM(total) FILTER (WHERE channel = 'online'), 0)::bigint AS online_revenue, \
                COALESCE(SUM(total) FILTER (WHERE channel = 'instore'), 0)::bigint AS instore_revenue, \
                COALESCE(SUM(total), 0)::bigint AS revenue, \
                COUNT(*) AS transaction_count \
         FROM ( \
             SELECT created_at::date AS day, total, 'online' AS channel FROM orders \
             WHERE status NOT IN ('cancelled', 'payment_rejected') \
               AND ($1::date IS NULL OR created_at::date >= $1) AND ($2::date IS NULL OR created_at::date <= $2) \
             UNION ALL \
             SELECT created_at::date, total, 'instore' FROM sales_transactions \
             WHERE ($1::date IS NULL OR created_at::date >= $1) AND ($2::date IS NULL OR created_at::date <= $2) \
         ) merged \
         GROUP BY day ORDER BY day",
    )
    .bind(range.start_date)
    .bind(range.end_date)
    .fetch_all(&s.db)
    .await?;
    Ok(Json(points))
}

#[derive(Debug, Deserialize)]
pub struct TopProductParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductStat {
    pub name: String,
    pub units_sold: i64,
    pub revenue: i64,
}

pub async fn top_products(_admin: AdminSession, State(s): State<AppState>, Query(p): Query<TopProductParams>) -> AppResult<Json<Vec<ProductStat>>> {
    let limit = p.limit.unwrap_or(10).clamp(1, 100);
    let stats = sqlx::query_as::<_, ProductStat>(
        "SELECT name, SUM(quantity)::bigint AS units_sold, SUM(price * quantity)::bigint AS revenue \
         FROM ( \
             SELECT oi.name, oi.quantity, oi.price FROM order_items oi \
             JOIN orders o ON oi.order_id = o.id \
             WHERE o.status NOT IN ('cancelled', 'payment_rejected') \
               AND ($1::date IS NULL OR o.created_at::date >= $1) AND ($2::date IS NULL OR o.created_at::date <= $2) \
             UNION ALL \
             SELECT si.name, si.quantity, si.price FROM sales_items si \
             JOIN sales_transactions st ON si.transaction_id = st.id \
             WHERE ($1::date IS NULL OR st.created_at::date >= $1) AND ($2::date IS NULL OR st.created_at::date <= $2) \
         ) merged \
         GROUP BY name ORDER BY units_sold DESC, name LIMIT $3",
    )
    .bind(p.start_date)
    .bind(p.end_date)
    .bind(limit)
    .fetch_all(&s.db)
    .await?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct ServiceReport {
    pub by_status: Vec<StatusCount>,
    pub open_on_time: i64,
    pub open_at_risk: i64,
    pub open_overdue: i64,
}

pub async fn service_summary(_admin: AdminSession, State(s): State<AppState>) -> AppResult<Json<ServiceReport>> {
    let by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM service_requests GROUP BY status ORDER BY status",
    )
    .fetch_all(&s.db)
    .await?;

    // SLA state is recomputed live; the stored column may be stale.
    let targets: Vec<(chrono::DateTime<Utc>,)> = sqlx::query_as(
        "SELECT sla_target FROM service_requests WHERE status NOT IN ('delivered', 'cancelled')",
    )
    .fetch_all(&s.db)
    .await?;
    let now = Utc::now();
    let mut on_time = 0;
    let mut at_risk = 0;
    let mut overdue = 0;
    for (target,) in targets {
        match sla::status_of(target, now) {
            SlaState::OnTime => on_time += 1,
            SlaState::AtRisk => at_risk += 1,
            SlaState::Overdue => overdue += 1,
        }
    }
    Ok(Json(ServiceReport { by_status, open_on_time: on_time, open_at_risk: at_risk, open_overdue: overdue }))
}

/// Printable HTML rendition of the sales summary. Spreadsheet export is left
/// to an external renderer; this covers the in-shop print workflow.
pub async fn sales_print(_admin: AdminSession, State(s): State<AppState>, Query(range): Query<RangeParams>) -> AppResult<Html<String>> {
    let report = load_summary(&s.db, range).await?;
    let period = match (range.start_date, range.end_date) {
        (Some(a), Some(b)) => format!("{} s/d {}", a, b),
        (Some(a), None) => format!("mulai {}", a),
        (None, Some(b)) => format!("sampai {}", b),
        (None, None) => "semua periode".to_string(),
    };
    let html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Laporan Penjualan</title>\
         <style>body{{font-family:sans-serif;margin:2em}}table{{border-collapse:collapse}}td,th{{border:1px solid #333;padding:6px 12px;text-align:right}}th:first-child,td:first-child{{text-align:left}}</style>\
         </head><body>\
         <h1>Laporan Penjualan</h1><p>Periode: {}</p>\
         <table><tr><th>Channel</th><th>Transaksi</th><th>Pendapatan (Rp)</th></tr>\
         <tr><td>Online</td><td>{}</td><td>{}</td></tr>\
         <tr><td>Toko (POS)</td><td>{}</td><td>{}</td></tr>\
         <tr><th>Total</th><th>{}</th><th>{}</th></tr>\
         </table></body></html>",
        period,
        report.online.transaction_count,
        report.online.revenue,
        report.instore.transaction_count,
        report.instore.revenue,
        report.combined.transaction_count,
        report.combined.revenue,
    );
    Ok(Html(html))
}
