// fixtures partagées par les tests des services et des routes

use std::path::Path;

use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::config::AppConfig;
use crate::models::dto::{CreateRecipeRequest, IngredientAmount};
use crate::models::{ingredient, recipe, tag, users};
use crate::services::recipe_service::RecipeService;
use crate::utils::{jwt, password};

/// PNG 1x1 encodé en data URI
pub const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub const TEST_PASSWORD: &str = "s3cret-pass";

pub async fn create_user(db: &DatabaseConnection, username: &str) -> users::Model {
    users::ActiveModel {
        email: Set(format!("{}@example.com", username)),
        username: Set(username.to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        password_hash: Set(password::hash_password(TEST_PASSWORD).expect("Failed to hash password")),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

pub async fn create_tag(db: &DatabaseConnection, name: &str, slug: &str) -> tag::Model {
    tag::ActiveModel {
        name: Set(name.to_string()),
        color: Set("#E26C2D".to_string()),
        slug: Set(slug.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert tag")
}

pub async fn create_ingredient(db: &DatabaseConnection, name: &str, unit: &str) -> ingredient::Model {
    ingredient::ActiveModel {
        name: Set(name.to_string()),
        measurement_unit: Set(unit.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert ingredient")
}

/// `ingredients` : paires (id ingrédient, quantité)
pub async fn create_recipe(
    db: &DatabaseConnection,
    author_id: i32,
    name: &str,
    tags: &[i32],
    ingredients: &[(i32, i32)],
) -> recipe::Model {
    let request = CreateRecipeRequest {
        tags: tags.to_vec(),
        ingredients: ingredients
            .iter()
            .map(|(id, amount)| IngredientAmount { id: *id, amount: *amount })
            .collect(),
        image: PIXEL.to_string(),
        name: name.to_string(),
        text: format!("How to make {}", name),
        cooking_time: 10,
    };

    RecipeService::create(db, author_id, request, "recipes/images/test.png".to_string())
        .await
        .expect("Failed to create recipe")
}

/// Valeur du header Authorization pour cet utilisateur
pub fn bearer(user: &users::Model) -> String {
    format!("Bearer {}", jwt::generate_token(user.id, &user.username))
}

pub fn test_config(media_root: &Path) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        media_root: media_root.to_path_buf(),
        media_url: "/media/".to_string(),
        create_schema: true,
    }
}
