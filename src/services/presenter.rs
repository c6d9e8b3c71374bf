use sea_orm::*;

use crate::config::AppConfig;
use crate::models::dto::{
    RecipeIngredientResponse, RecipeResponse, ShortRecipeResponse, SubscriptionResponse, UserResponse,
};
use crate::models::{ingredient, recipe, recipe_ingredient, recipe_tag, tag, users};
use crate::services::recipe_service::RecipeService;
use crate::services::relation_service::RelationService;
use crate::services::subscription_service::SubscriptionService;

/// Construit les réponses JSON vues par un visiteur donné
/// (`viewer` = None pour un anonyme : tous les champs calculés à false)
pub struct Presenter<'a> {
    db: &'a DatabaseConnection,
    config: &'a AppConfig,
    viewer: Option<i32>,
}

impl<'a> Presenter<'a> {
    pub fn new(db: &'a DatabaseConnection, config: &'a AppConfig, viewer: Option<i32>) -> Self {
        Self { db, config, viewer }
    }

    pub async fn user(&self, user: users::Model) -> Result<UserResponse, DbErr> {
        let is_subscribed = SubscriptionService::is_subscribed(self.db, self.viewer, user.id).await?;
        Ok(UserResponse::new(user, is_subscribed))
    }

    pub async fn users(&self, users: Vec<users::Model>) -> Result<Vec<UserResponse>, DbErr> {
        let mut responses = Vec::with_capacity(users.len());
        for user in users {
            responses.push(self.user(user).await?);
        }
        Ok(responses)
    }

    pub async fn recipe(&self, recipe: recipe::Model) -> Result<RecipeResponse, DbErr> {
        let author = match recipe.author_id {
            Some(author_id) => match users::Entity::find_by_id(author_id).one(self.db).await? {
                Some(user) => Some(self.user(user).await?),
                None => None,
            },
            None => None,
        };

        // lignes de jointure dont le tag / l'ingrédient a disparu : ignorées
        let tags: Vec<tag::Model> = recipe_tag::Entity::find()
            .filter(recipe_tag::Column::RecipeId.eq(recipe.id))
            .order_by_asc(recipe_tag::Column::Id)
            .find_also_related(tag::Entity)
            .all(self.db)
            .await?
            .into_iter()
            .filter_map(|(_, tag)| tag)
            .collect();

        let ingredients: Vec<RecipeIngredientResponse> = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
            .order_by_asc(recipe_ingredient::Column::Id)
            .find_also_related(ingredient::Entity)
            .all(self.db)
            .await?
            .into_iter()
            .filter_map(|(row, ingredient)| {
                ingredient.map(|ingredient| RecipeIngredientResponse {
                    id: ingredient.id,
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: row.amount,
                })
            })
            .collect();

        let flags = RelationService::flags(self.db, self.viewer, recipe.id).await?;

        Ok(RecipeResponse {
            id: recipe.id,
            author,
            tags,
            ingredients,
            image: self.config.image_url(&recipe.image),
            is_favorited: flags.is_favorited,
            is_in_shopping_cart: flags.is_in_shopping_cart,
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        })
    }

    pub async fn recipes(&self, recipes: Vec<recipe::Model>) -> Result<Vec<RecipeResponse>, DbErr> {
        let mut responses = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            responses.push(self.recipe(recipe).await?);
        }
        Ok(responses)
    }

    pub fn short_recipe(&self, recipe: recipe::Model) -> ShortRecipeResponse {
        ShortRecipeResponse {
            id: recipe.id,
            image: self.config.image_url(&recipe.image),
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }

    /// Auteur suivi + ses recettes (limitées à `recipes_limit` si > 0)
    pub async fn subscription(
        &self,
        author: users::Model,
        recipes_limit: Option<u64>,
    ) -> Result<SubscriptionResponse, DbErr> {
        let recipes = RecipeService::by_author(self.db, author.id, recipes_limit).await?;
        let recipes_count = RecipeService::count_by_author(self.db, author.id).await?;

        Ok(SubscriptionResponse {
            recipes: recipes.into_iter().map(|r| self.short_recipe(r)).collect(),
            recipes_count,
            author: self.user(author).await?,
        })
    }
}
