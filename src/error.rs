//! Application error type.
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse` impl maps
//! the variant to an HTTP status and a `{"error": "..."}` JSON body. Error
//! strings keep the shop's mixed Indonesian/English register.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Autentikasi gagal: {0}")]
    Unauthorized(String),

    #[error("Akses ditolak: {0}")]
    Forbidden(String),

    #[error("Data tidak ditemukan: {0}")]
    NotFound(String),

    #[error("Validasi gagal: {0}")]
    Validation(String),

    #[error("{0}")]
    BusinessRule(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BusinessRule(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Validation(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Unauthorized("no token".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("bukan admin".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("order".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BusinessRule("Stok tidak cukup".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_messages_pass_through() {
        assert_eq!(AppError::BusinessRule("Keranjang kosong".into()).to_string(), "Keranjang kosong");
    }
}
