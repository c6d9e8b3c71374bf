use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::models::health::HealthResponse;

/// GET /api/health - état du service et de la base
#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let (status, database) = match db.ping().await {
        Ok(()) => ("ok", "ok".to_string()),
        Err(e) => {
            log::warn!("Database ping failed: {}", e);
            ("degraded", e.to_string())
        }
    };

    let response = HealthResponse {
        status: status.to_string(),
        database,
        time: Utc::now(),
    };

    if status == "ok" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
