use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::models::dto::IngredientSearch;
use crate::services::catalogue_service::CatalogueService;

/// GET /api/ingredients?name=<début du nom> (PUBLIC)
#[get("")]
pub async fn list_ingredients(
    query: web::Query<IngredientSearch>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let ingredients = CatalogueService::search_ingredients(db.get_ref(), query.name.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ingredients))
}

/// GET /api/ingredients/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_ingredient(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let ingredient = CatalogueService::get_ingredient(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ingredient))
}

pub fn ingredients_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ingredients")
            .service(list_ingredients)
            .service(get_ingredient)
    );
}
