use sea_orm::*;
use sea_orm::sea_query::{Query, SelectStatement};

use crate::error::AppError;
use crate::models::{favorite, recipe, shopping_cart};

/// Relation (utilisateur, recette) sans autre donnée : favoris et panier.
/// Les deux tables partagent la même logique d'ajout / suppression.
pub trait UserRecipeRelation:
    EntityTrait<Model: IntoActiveModel<<Self as EntityTrait>::ActiveModel>>
{
    /// Nom lisible utilisé dans les messages d'erreur
    const LABEL: &'static str;

    fn user_column() -> Self::Column;
    fn recipe_column() -> Self::Column;
    fn new_row(user_id: i32, recipe_id: i32) -> Self::ActiveModel;
}

impl UserRecipeRelation for favorite::Entity {
    const LABEL: &'static str = "favorites";

    fn user_column() -> Self::Column {
        favorite::Column::UserId
    }

    fn recipe_column() -> Self::Column {
        favorite::Column::RecipeId
    }

    fn new_row(user_id: i32, recipe_id: i32) -> Self::ActiveModel {
        favorite::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
        }
    }
}

impl UserRecipeRelation for shopping_cart::Entity {
    const LABEL: &'static str = "shopping cart";

    fn user_column() -> Self::Column {
        shopping_cart::Column::UserId
    }

    fn recipe_column() -> Self::Column {
        shopping_cart::Column::RecipeId
    }

    fn new_row(user_id: i32, recipe_id: i32) -> Self::ActiveModel {
        shopping_cart::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
        }
    }
}

/// Champs calculés d'une recette pour un visiteur donné
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecipeFlags {
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

pub struct RelationService;

impl RelationService {
    pub async fn exists<R, C>(db: &C, user_id: i32, recipe_id: i32) -> Result<bool, DbErr>
    where
        R: UserRecipeRelation,
        C: ConnectionTrait,
    {
        let row = R::find()
            .filter(R::user_column().eq(user_id))
            .filter(R::recipe_column().eq(recipe_id))
            .one(db)
            .await?;

        Ok(row.is_some())
    }

    /// Ajoute la recette à la relation. Erreur si elle y est déjà :
    /// un second ajout n'est pas silencieusement accepté.
    pub async fn add<R, C>(db: &C, user_id: i32, recipe_id: i32) -> Result<recipe::Model, AppError>
    where
        R: UserRecipeRelation,
        C: ConnectionTrait,
    {
        let recipe = find_recipe(db, recipe_id).await?;

        if Self::exists::<R, C>(db, user_id, recipe_id).await? {
            return Err(AppError::conflict(format!(
                "Recipe {} is already in {}",
                recipe_id,
                R::LABEL
            )));
        }

        // la clé composite rejette aussi un doublon concurrent (-> Conflict)
        R::insert(R::new_row(user_id, recipe_id))
            .exec_without_returning(db)
            .await?;

        log::info!("User {} added recipe {} to {}", user_id, recipe_id, R::LABEL);
        Ok(recipe)
    }

    /// Retire la recette de la relation. Erreur si elle n'y était pas.
    pub async fn remove<R, C>(db: &C, user_id: i32, recipe_id: i32) -> Result<(), AppError>
    where
        R: UserRecipeRelation,
        C: ConnectionTrait,
    {
        find_recipe(db, recipe_id).await?;

        let result = R::delete_many()
            .filter(R::user_column().eq(user_id))
            .filter(R::recipe_column().eq(recipe_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::conflict(format!(
                "Recipe {} is not in {}",
                recipe_id,
                R::LABEL
            )));
        }

        log::info!("User {} removed recipe {} from {}", user_id, recipe_id, R::LABEL);
        Ok(())
    }

    /// SELECT recipe_id FROM <relation> WHERE user_id = ?
    /// pour filtrer les listes de recettes
    pub fn recipe_ids_of<R: UserRecipeRelation>(user_id: i32) -> SelectStatement {
        Query::select()
            .column(R::recipe_column())
            .from(R::default())
            .and_where(R::user_column().eq(user_id))
            .to_owned()
    }

    /// is_favorited / is_in_shopping_cart, toujours false pour un anonyme
    pub async fn flags<C>(db: &C, viewer: Option<i32>, recipe_id: i32) -> Result<RecipeFlags, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(user_id) = viewer else {
            return Ok(RecipeFlags::default());
        };

        Ok(RecipeFlags {
            is_favorited: Self::exists::<favorite::Entity, C>(db, user_id, recipe_id).await?,
            is_in_shopping_cart: Self::exists::<shopping_cart::Entity, C>(db, user_id, recipe_id)
                .await?,
        })
    }
}

async fn find_recipe<C: ConnectionTrait>(db: &C, recipe_id: i32) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Recipe {}", recipe_id)))
}
