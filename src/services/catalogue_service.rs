use sea_orm::*;
use sea_orm::sea_query::{Expr, Func, LikeExpr};

use crate::error::AppError;
use crate::models::{ingredient, tag};

/// Lecture seule : les tags et ingrédients sont chargés hors API
pub struct CatalogueService;

impl CatalogueService {
    pub async fn list_tags(db: &DatabaseConnection) -> Result<Vec<tag::Model>, DbErr> {
        tag::Entity::find()
            .order_by_asc(tag::Column::Id)
            .all(db)
            .await
    }

    pub async fn get_tag(db: &DatabaseConnection, tag_id: i32) -> Result<tag::Model, AppError> {
        tag::Entity::find_by_id(tag_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tag {}", tag_id)))
    }

    /// Ingrédients dont le nom commence par `prefix`, sans tenir compte de la
    /// casse (tous si None), triés par nom. `%` et `_` sont pris littéralement.
    pub async fn search_ingredients(
        db: &DatabaseConnection,
        prefix: Option<&str>,
    ) -> Result<Vec<ingredient::Model>, DbErr> {
        let mut query = ingredient::Entity::find();

        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((ingredient::Entity, ingredient::Column::Name))))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }

        query
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::Id)
            .all(db)
            .await
    }

    pub async fn get_ingredient(
        db: &DatabaseConnection,
        ingredient_id: i32,
    ) -> Result<ingredient::Model, AppError> {
        ingredient::Entity::find_by_id(ingredient_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {}", ingredient_id)))
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
