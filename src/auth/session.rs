//! DB-backed bearer sessions and the role-gating extractors.

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::Role;
use crate::error::AppError;
use crate::AppState;

const SESSION_HOURS: i64 = 8;

/// Authenticated principal attached to a request.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

/// Creates a session row and returns the bearer token.
pub async fn create(db: &PgPool, user_id: Uuid, role: Role) -> Result<Uuid, sqlx::Error> {
    let token = Uuid::new_v4();
    sqlx::query("INSERT INTO sessions (token, user_id, role, expires_at) VALUES ($1, $2, $3, $4)")
        .bind(token)
        .bind(user_id)
        .bind(role.as_str())
        .bind(Utc::now() + Duration::hours(SESSION_HOURS))
        .execute(db)
        .await?;
    Ok(token)
}

pub async fn destroy(db: &PgPool, token: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

/// Pulls the `Bearer <uuid>` token out of the Authorization header.
pub fn bearer_from_headers(headers: &axum::http::HeaderMap) -> Result<Uuid, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("token tidak ada, silakan login".into()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("format Authorization salah".into()))?;
    Uuid::parse_str(token.trim()).map_err(|_| AppError::Unauthorized("token tidak valid".into()))
}

async fn lookup(db: &PgPool, token: Uuid) -> Result<Session, AppError> {
    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT user_id, role FROM sessions WHERE token = $1 AND expires_at > NOW()")
            .bind(token)
            .fetch_optional(db)
            .await?;
    let (user_id, role) = row.ok_or_else(|| AppError::Unauthorized("sesi tidak valid atau expired, silakan login ulang".into()))?;
    let role = Role::parse(&role).ok_or_else(|| AppError::Unauthorized("role tidak dikenal".into()))?;
    Ok(Session { user_id, role })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_from_headers(&parts.headers)?;
        lookup(&state.db, token).await
    }
}

/// Requires role `admin`.
#[derive(Clone, Debug)]
pub struct AdminSession(pub Session);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role != Role::Admin {
            return Err(AppError::Forbidden("hanya Admin yang bisa melakukan ini".into()));
        }
        Ok(AdminSession(session))
    }
}

/// Requires role `admin` or `kasir` (POS register access).
#[derive(Clone, Debug)]
pub struct StaffSession(pub Session);

#[axum::async_trait]
impl FromRequestParts<AppState> for StaffSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if !session.role.is_staff() {
            return Err(AppError::Forbidden("hanya Admin atau Kasir yang bisa melakukan ini".into()));
        }
        Ok(StaffSession(session))
    }
}
