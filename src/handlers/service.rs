//! Service tickets (repair intake) with SLA targets.
//!
//! The SLA target is computed once at creation; the stored `sla_status` is a
//! snapshot and every read path recomputes it against the current clock
//! before responding.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminSession;
use crate::domain::codes;
use crate::domain::sla::{self, DeviceType, Priority};
use crate::domain::status::ServiceStatus;
use crate::error::{AppError, AppResult};
use crate::handlers::products::{page_offset, ListParams, PaginatedResponse};
use crate::models::ServiceRequest;
use crate::AppState;

fn with_live_sla(mut ticket: ServiceRequest) -> ServiceRequest {
    ticket.sla_status = sla::status_of(ticket.sla_target, Utc::now()).as_str().to_string();
    ticket
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub device_type: String,
    #[validate(length(min = 1, max = 2000))]
    pub complaint: String,
    #[validate(length(min = 1, max = 100))]
    pub customer_name: String,
    #[validate(length(min = 5, max = 20))]
    pub phone: String,
    pub address: Option<String>,
    pub priority: Option<String>,
}

pub async fn create(State(s): State<AppState>, Json(r): Json<CreateTicketRequest>) -> AppResult<(StatusCode, Json<ServiceRequest>)> {
    r.validate()?;
    let device = DeviceType::parse(&r.device_type)
        .ok_or_else(|| AppError::Validation(format!("jenis perangkat tidak dikenal: {}", r.device_type)))?;
    let priority = match r.priority.as_deref() {
        None | Some("") => Priority::Normal,
        Some(p) => Priority::parse(p).ok_or_else(|| AppError::Validation(format!("prioritas tidak dikenal: {}", p)))?,
    };

    let now = Utc::now();
    let target = sla::calculate_target(device, priority, now);
    let state = sla::status_of(target, now);

    let ticket = sqlx::query_as::<_, ServiceRequest>(
        "INSERT INTO service_requests (id, code, device_type, complaint, customer_name, phone, address, priority, sla_target, sla_status, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(codes::service_code(now))
    .bind(device.as_str())
    .bind(r.complaint.trim())
    .bind(r.customer_name.trim())
    .bind(r.phone.trim())
    .bind(&r.address)
    .bind(priority.as_str())
    .bind(target)
    .bind(state.as_str())
    .bind(ServiceStatus::Received.as_str())
    .fetch_one(&s.db)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::BusinessRule("Kode servis bentrok, silakan coba lagi".into()),
        _ => AppError::Database(e),
    })?;
    tracing::info!(code = %ticket.code, device = device.as_str(), priority = priority.as_str(), "service ticket created");
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn list(_admin: AdminSession, State(s): State<AppState>, Query(p): Query<ListParams>) -> AppResult<Json<PaginatedResponse<ServiceRequest>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let tickets = sqlx::query_as::<_, ServiceRequest>(
        "SELECT * FROM service_requests ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(page_offset(page, per_page))
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM service_requests")
        .fetch_one(&s.db)
        .await?;
    let data = tickets.into_iter().map(with_live_sla).collect();
    Ok(Json(PaginatedResponse { data, total: total.0, page }))
}

pub async fn get_one(_admin: AdminSession, State(s): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<ServiceRequest>> {
    let ticket = sqlx::query_as::<_, ServiceRequest>("SELECT * FROM service_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or_else(|| AppError::NotFound("tiket servis".into()))?;
    Ok(Json(with_live_sla(ticket)))
}

/// Public tracking endpoint: customers look their ticket up by SRV code.
pub async fn track_by_code(State(s): State<AppState>, Path(code): Path<String>) -> AppResult<Json<ServiceRequest>> {
    let ticket = sqlx::query_as::<_, ServiceRequest>("SELECT * FROM service_requests WHERE code = $1")
        .bind(code.trim())
        .fetch_optional(&s.db)
        .await?
        .ok_or_else(|| AppError::NotFound("tiket servis".into()))?;
    Ok(Json(with_live_sla(ticket)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: String,
}

pub async fn admin_update(_admin: AdminSession, State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<UpdateTicketRequest>) -> AppResult<Json<ServiceRequest>> {
    let next = ServiceStatus::parse(&r.status)
        .ok_or_else(|| AppError::Validation(format!("status tidak dikenal: {}", r.status)))?;

    let ticket = sqlx::query_as::<_, ServiceRequest>("SELECT * FROM service_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or_else(|| AppError::NotFound("tiket servis".into()))?;
    let current = ServiceStatus::parse(&ticket.status)
        .ok_or_else(|| AppError::Internal(format!("status tiket korup: {}", ticket.status)))?;

    if !current.can_transition_to(next) {
        return Err(AppError::BusinessRule(format!(
            "Transisi status {} -> {} tidak diizinkan",
            current.as_str(),
            next.as_str()
        )));
    }

    let updated = sqlx::query_as::<_, ServiceRequest>(
        "UPDATE service_requests SET status = $2, sla_status = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(next.as_str())
    .bind(sla::status_of(ticket.sla_target, Utc::now()).as_str())
    .fetch_one(&s.db)
    .await?;
    tracing::info!(code = %updated.code, from = current.as_str(), to = next.as_str(), "service ticket status updated");
    Ok(Json(updated))
}
