pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use actix_web::web;

use crate::error::AppError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // erreurs d'extraction : même corps JSON que les autres erreurs
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|e, _| AppError::Validation(e.to_string()).into()),
            )
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|e, _| AppError::Validation(e.to_string()).into()),
            )
            .app_data(
                web::PathConfig::default()
                    .error_handler(|_, req| AppError::not_found(req.path().to_string()).into()),
            )
            .service(health::health_check)
            .configure(users::users_routes)
            .configure(tags::tags_routes)
            .configure(ingredients::ingredients_routes)
            .configure(recipes::recipes_routes)
    );
}
