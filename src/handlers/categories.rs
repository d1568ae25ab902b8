//! Category CRUD.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminSession;
use crate::error::{AppError, AppResult};
use crate::models::Category;
use crate::AppState;

pub async fn list(State(s): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let cats = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&s.db)
        .await?;
    Ok(Json(cats))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

pub async fn create(_admin: AdminSession, State(s): State<AppState>, Json(r): Json<CategoryRequest>) -> AppResult<(StatusCode, Json<Category>)> {
    r.validate()?;
    let slug = r.name.trim().to_lowercase().replace(' ', "-");
    let cat = sqlx::query_as::<_, Category>("INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) RETURNING *")
        .bind(Uuid::new_v4())
        .bind(r.name.trim())
        .bind(&slug)
        .fetch_one(&s.db)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => AppError::BusinessRule("Kategori sudah ada".into()),
            _ => AppError::Database(e),
        })?;
    Ok((StatusCode::CREATED, Json(cat)))
}
