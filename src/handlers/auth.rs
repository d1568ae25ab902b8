//! Register, login, logout.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{password, session, Role};
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

pub async fn register(State(s): State<AppState>, Json(r): Json<RegisterRequest>) -> AppResult<(StatusCode, Json<User>)> {
    r.validate()?;
    let hash = password::hash(&r.password)?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, username, password_hash, name, role) VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(r.username.trim())
    .bind(&hash)
    .bind(r.name.trim())
    .bind(Role::Customer.as_str())
    .fetch_one(&s.db)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::BusinessRule("Username sudah dipakai".into()),
        _ => AppError::Database(e),
    })?;
    tracing::info!(username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(State(s): State<AppState>, Json(r): Json<LoginRequest>) -> AppResult<Json<serde_json::Value>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(r.username.trim())
        .fetch_optional(&s.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("username atau password salah".into()))?;
    if !password::verify(&r.password, &user.password_hash) {
        return Err(AppError::Unauthorized("username atau password salah".into()));
    }
    let role = Role::parse(&user.role).ok_or_else(|| AppError::Internal(format!("role tidak dikenal: {}", user.role)))?;
    let token = session::create(&s.db, user.id, role).await?;
    Ok(Json(serde_json::json!({ "token": token, "user": user })))
}

pub async fn logout(State(s): State<AppState>, headers: HeaderMap) -> AppResult<StatusCode> {
    let token = session::bearer_from_headers(&headers)?;
    session::destroy(&s.db, token).await?;
    Ok(StatusCode::NO_CONTENT)
}
