//! Erreurs applicatives et leur traduction en réponses HTTP
//!
//! | Variante | Statut |
//! |----------|--------|
//! | Validation, InvalidInput, Conflict | 400 |
//! | Unauthorized | 401 |
//! | Forbidden | 403 |
//! | NotFound | 404 |
//! | Database, Internal | 500 |
//!
//! Les conflits (doublon favori/panier/abonnement, suppression d'une relation
//! absente, auto-abonnement) restent en 400 comme l'API d'origine, avec un
//! message distinct par cause.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid input")]
    InvalidInput(#[from] ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // doublon détecté par la base (clé composite, email/username unique)
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                AppError::Conflict(format!("Already exists: {}", detail))
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());

        match self {
            AppError::InvalidInput(errors) => response.json(serde_json::json!({
                "error": self.to_string(),
                "fields": errors
            })),
            AppError::Database(_) | AppError::Internal(_) => {
                log::error!("{}", self);
                response.json(serde_json::json!({
                    "error": self.to_string()
                }))
            }
            _ => response.json(serde_json::json!({
                "error": self.to_string()
            })),
        }
    }
}
