//pour les requêtes et les réponses structurées
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::models::{tag, users};

// ---------------------------------------------------------------------------
// Requêtes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1, max = 150))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordRequest {
    pub current_password: String,
    #[validate(length(min = 1))]
    pub new_password: String,
}

// 1 ingrédient d'une recette : {"id": 12, "amount": 200}
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct IngredientAmount {
    pub id: i32,
    #[validate(range(min = 1))]
    pub amount: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
    pub image: String, // data:image/png;base64,....
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(range(min = 1))]
    pub cooking_time: i32,
}

// PATCH : un champ absent n'est pas modifié, une liste vide vide la relation
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub image: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub text: Option<String>,
    #[validate(range(min = 1))]
    pub cooking_time: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearch {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionsQuery {
    pub recipes_limit: Option<u64>,
}

/// Filtres de GET /api/recipes
/// ?tags=breakfast&tags=lunch&is_favorited=1&is_in_shopping_cart=0&author=3
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecipeFilter {
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub author: Option<i32>,
}

impl RecipeFilter {
    /// Construit le filtre depuis les paires brutes de la query string
    /// (le paramètre `tags` peut être répété)
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, AppError> {
        let mut filter = RecipeFilter::default();

        for (key, value) in pairs {
            match key.as_str() {
                "tags" => filter.tags.push(value),
                "is_favorited" => filter.is_favorited = parse_flag(&key, &value)?,
                "is_in_shopping_cart" => filter.is_in_shopping_cart = parse_flag(&key, &value)?,
                "author" => {
                    let author = value
                        .parse::<i32>()
                        .map_err(|_| AppError::Validation(format!("Invalid author id: {}", value)))?;
                    filter.author = Some(author);
                }
                _ => {}
            }
        }

        Ok(filter)
    }
}

// seule la valeur 1 active le filtre
fn parse_flag(key: &str, value: &str) -> Result<bool, AppError> {
    value
        .parse::<i64>()
        .map(|v| v == 1)
        .map_err(|_| AppError::Validation(format!("Invalid value for {}: {}", key, value)))
}

// ---------------------------------------------------------------------------
// Réponses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: users::Model, is_subscribed: bool) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

// id = id de l'ingrédient, pas de la ligne de jointure
#[derive(Debug, PartialEq, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub author: Option<UserResponse>,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub image: String,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

// Réponse des ajouts favori/panier et des listes d'abonnements
#[derive(Debug, Serialize)]
pub struct ShortRecipeResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub author: UserResponse,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: u64,
}
