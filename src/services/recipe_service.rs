use std::collections::HashSet;

use chrono::Utc;
use sea_orm::*;
use sea_orm::sea_query::{Expr, Query};
use validator::Validate;

use crate::error::AppError;
use crate::models::dto::{CreateRecipeRequest, IngredientAmount, RecipeFilter, UpdateRecipeRequest};
use crate::models::{
    favorite, ingredient, recipe, recipe_ingredient, recipe_tag, shopping_cart, tag,
};
use crate::services::relation_service::RelationService;

pub struct RecipeService;

impl RecipeService {
    /// Contrôles faits avant toute écriture (image comprise)
    pub fn validate_create(request: &CreateRecipeRequest) -> Result<(), AppError> {
        request.validate()?;
        validate_tag_ids(&request.tags)?;
        validate_ingredients(&request.ingredients)
    }

    pub fn validate_update(request: &UpdateRecipeRequest) -> Result<(), AppError> {
        request.validate()?;
        if let Some(tags) = &request.tags {
            validate_tag_ids(tags)?;
        }
        if let Some(ingredients) = &request.ingredients {
            validate_ingredients(ingredients)?;
        }
        Ok(())
    }

    /// Crée la recette et ses lignes de jointure dans une seule transaction.
    /// `image` est le chemin déjà écrit sous MEDIA_ROOT.
    pub async fn create(
        db: &DatabaseConnection,
        author_id: i32,
        request: CreateRecipeRequest,
        image: String,
    ) -> Result<recipe::Model, AppError> {
        Self::validate_create(&request)?;

        let txn = db.begin().await?;

        let new_recipe = recipe::ActiveModel {
            author_id: Set(Some(author_id)),
            name: Set(request.name),
            text: Set(request.text),
            image: Set(image),
            cooking_time: Set(request.cooking_time),
            pub_date: Set(Utc::now()),
            ..Default::default()
        };
        let recipe = new_recipe.insert(&txn).await?;

        replace_tags(&txn, recipe.id, &request.tags).await?;
        replace_ingredients(&txn, recipe.id, &request.ingredients).await?;

        txn.commit().await?;

        log::info!("Recipe {} created by user {}", recipe.id, author_id);
        Ok(recipe)
    }

    /// Mise à jour partielle par l'auteur.
    /// Chaque liste fournie remplace entièrement l'ancienne (suppression puis
    /// réinsertion), une liste absente n'est pas touchée.
    pub async fn update(
        db: &DatabaseConnection,
        recipe_id: i32,
        editor_id: i32,
        request: UpdateRecipeRequest,
        image: Option<String>,
    ) -> Result<recipe::Model, AppError> {
        Self::validate_update(&request)?;

        let txn = db.begin().await?;

        // verrou sur la recette : deux mises à jour concurrentes ne
        // s'entrelacent pas entre le DELETE et l'INSERT des jointures
        let recipe = find_for_update(&txn, recipe_id).await?;
        ensure_author(&recipe, editor_id)?;

        if let Some(tags) = &request.tags {
            replace_tags(&txn, recipe.id, tags).await?;
        }
        if let Some(ingredients) = &request.ingredients {
            replace_ingredients(&txn, recipe.id, ingredients).await?;
        }

        let mut active: recipe::ActiveModel = recipe.clone().into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(text) = request.text {
            active.text = Set(text);
        }
        if let Some(cooking_time) = request.cooking_time {
            active.cooking_time = Set(cooking_time);
        }
        if let Some(image) = image {
            active.image = Set(image);
        }

        let recipe = if active.is_changed() {
            active.update(&txn).await?
        } else {
            recipe
        };

        txn.commit().await?;

        log::info!("Recipe {} updated by user {}", recipe.id, editor_id);
        Ok(recipe)
    }

    /// Supprime la recette, ses jointures, favoris et entrées de panier
    pub async fn delete(
        db: &DatabaseConnection,
        recipe_id: i32,
        editor_id: i32,
    ) -> Result<(), AppError> {
        let txn = db.begin().await?;

        let recipe = find_for_update(&txn, recipe_id).await?;
        ensure_author(&recipe, editor_id)?;

        recipe_tag::Entity::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;
        recipe_ingredient::Entity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;
        favorite::Entity::delete_many()
            .filter(favorite::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;
        shopping_cart::Entity::delete_many()
            .filter(shopping_cart::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;
        recipe::Entity::delete_by_id(recipe.id).exec(&txn).await?;

        txn.commit().await?;

        log::info!("Recipe {} deleted by user {}", recipe_id, editor_id);
        Ok(())
    }

    pub async fn get(db: &DatabaseConnection, recipe_id: i32) -> Result<recipe::Model, AppError> {
        recipe::Entity::find_by_id(recipe_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {}", recipe_id)))
    }

    /// Liste filtrée, plus récentes d'abord.
    /// is_favorited / is_in_shopping_cart pour un anonyme -> liste vide.
    pub async fn list(
        db: &DatabaseConnection,
        viewer: Option<i32>,
        filter: &RecipeFilter,
    ) -> Result<Vec<recipe::Model>, DbErr> {
        let mut query = recipe::Entity::find();

        if !filter.tags.is_empty() {
            // au moins un des tags demandés
            let with_tags = Query::select()
                .column((recipe_tag::Entity, recipe_tag::Column::RecipeId))
                .from(recipe_tag::Entity)
                .inner_join(
                    tag::Entity,
                    Expr::col((tag::Entity, tag::Column::Id))
                        .equals((recipe_tag::Entity, recipe_tag::Column::TagId)),
                )
                .and_where(tag::Column::Slug.is_in(filter.tags.clone()))
                .to_owned();
            query = query.filter(recipe::Column::Id.in_subquery(with_tags));
        }

        if filter.is_favorited || filter.is_in_shopping_cart {
            let Some(user_id) = viewer else {
                return Ok(Vec::new());
            };
            if filter.is_favorited {
                query = query.filter(
                    recipe::Column::Id
                        .in_subquery(RelationService::recipe_ids_of::<favorite::Entity>(user_id)),
                );
            }
            if filter.is_in_shopping_cart {
                query = query.filter(
                    recipe::Column::Id
                        .in_subquery(RelationService::recipe_ids_of::<shopping_cart::Entity>(user_id)),
                );
            }
        }

        if let Some(author_id) = filter.author {
            query = query.filter(recipe::Column::AuthorId.eq(author_id));
        }

        query
            .order_by_desc(recipe::Column::PubDate)
            .order_by_desc(recipe::Column::Id)
            .all(db)
            .await
    }

    /// Recettes d'un auteur, plus récentes d'abord, tronquées si limit > 0
    pub async fn by_author(
        db: &DatabaseConnection,
        author_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<recipe::Model>, DbErr> {
        let mut query = recipe::Entity::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .order_by_desc(recipe::Column::PubDate)
            .order_by_desc(recipe::Column::Id);

        if let Some(limit) = limit.filter(|l| *l > 0) {
            query = query.limit(limit);
        }

        query.all(db).await
    }

    pub async fn count_by_author(db: &DatabaseConnection, author_id: i32) -> Result<u64, DbErr> {
        recipe::Entity::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .count(db)
            .await
    }
}

fn validate_tag_ids(tags: &[i32]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for id in tags {
        if !seen.insert(*id) {
            return Err(AppError::Validation(format!("Duplicate tag: {}", id)));
        }
    }
    Ok(())
}

fn validate_ingredients(ingredients: &[IngredientAmount]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for item in ingredients {
        item.validate()?;
        if !seen.insert(item.id) {
            return Err(AppError::Validation(format!("Duplicate ingredient: {}", item.id)));
        }
    }
    Ok(())
}

async fn find_for_update(
    txn: &DatabaseTransaction,
    recipe_id: i32,
) -> Result<recipe::Model, AppError> {
    let mut query = recipe::Entity::find_by_id(recipe_id);
    // SQLite verrouille déjà toute la base pendant une transaction d'écriture
    if txn.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_exclusive();
    }

    query
        .one(txn)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Recipe {}", recipe_id)))
}

fn ensure_author(recipe: &recipe::Model, editor_id: i32) -> Result<(), AppError> {
    if recipe.author_id != Some(editor_id) {
        return Err(AppError::Forbidden(format!(
            "Only the author can modify recipe {}",
            recipe.id
        )));
    }
    Ok(())
}

/// Remplace toutes les lignes recipe_tags de la recette
async fn replace_tags(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    tag_ids: &[i32],
) -> Result<(), AppError> {
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(txn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let found: HashSet<i32> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids.iter().copied()))
        .all(txn)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    if let Some(missing) = tag_ids.iter().find(|id| !found.contains(id)) {
        return Err(AppError::not_found(format!("Tag {}", missing)));
    }

    let rows = tag_ids.iter().map(|tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(Some(*tag_id)),
        ..Default::default()
    });
    recipe_tag::Entity::insert_many(rows).exec(txn).await?;

    Ok(())
}

/// Remplace toutes les lignes recipe_ingredients de la recette
async fn replace_ingredients(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    ingredients: &[IngredientAmount],
) -> Result<(), AppError> {
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(txn)
        .await?;

    if ingredients.is_empty() {
        return Ok(());
    }

    let found: HashSet<i32> = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ingredients.iter().map(|i| i.id)))
        .all(txn)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    if let Some(missing) = ingredients.iter().find(|i| !found.contains(&i.id)) {
        return Err(AppError::not_found(format!("Ingredient {}", missing.id)));
    }

    let rows = ingredients.iter().map(|item| recipe_ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(Some(item.id)),
        amount: Set(item.amount),
        ..Default::default()
    });
    recipe_ingredient::Entity::insert_many(rows).exec(txn).await?;

    Ok(())
}
