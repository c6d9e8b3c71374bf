use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, patch, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateRecipeRequest, RecipeFilter, UpdateRecipeRequest};
use crate::models::{favorite, shopping_cart};
use crate::services::presenter::Presenter;
use crate::services::recipe_service::RecipeService;
use crate::services::relation_service::{RelationService, UserRecipeRelation};
use crate::services::shopping_list_service::{
    render_shopping_list, ShoppingListService, SHOPPING_LIST_FILENAME,
};
use crate::utils::image;

/// GET /api/recipes - liste filtrée (PUBLIC)
/// ?tags=<slug>&tags=<slug>&author=<id>&is_favorited=1&is_in_shopping_cart=1
#[get("")]
pub async fn list_recipes(
    viewer: Option<AuthUser>,
    query: web::Query<Vec<(String, String)>>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let filter = RecipeFilter::from_pairs(query.into_inner())?;
    let viewer_id = AuthUser::viewer_id(&viewer);

    let recipes = RecipeService::list(db.get_ref(), viewer_id, &filter).await?;
    let response = Presenter::new(db.get_ref(), config.get_ref(), viewer_id)
        .recipes(recipes)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/recipes - créer une recette (PROTÉGÉE)
#[post("")]
pub async fn create_recipe(
    auth_user: AuthUser,
    body: web::Json<CreateRecipeRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    // 1. Valider avant d'écrire l'image
    RecipeService::validate_create(&request)?;

    // 2. Écrire l'image
    let image_path = image::save_base64_image(&config.media_root, &request.image).await?;

    // 3. Créer la recette (transaction)
    let result =
        RecipeService::create(db.get_ref(), auth_user.user_id, request, image_path.clone()).await;

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(e) => {
            discard_image(&config, &image_path).await;
            return Err(e);
        }
    };

    let response = Presenter::new(db.get_ref(), config.get_ref(), Some(auth_user.user_id))
        .recipe(recipe)
        .await?;

    Ok(HttpResponse::Created().json(response))
}

/// GET /api/recipes/download_shopping_cart - liste de courses en texte (PROTÉGÉE)
#[get("/download_shopping_cart")]
pub async fn download_shopping_cart(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let lines = ShoppingListService::collect(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(SHOPPING_LIST_FILENAME.to_string())],
        })
        .body(render_shopping_list(&lines)))
}

/// GET /api/recipes/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_recipe(
    viewer: Option<AuthUser>,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let recipe = RecipeService::get(db.get_ref(), path.into_inner()).await?;
    let response = Presenter::new(db.get_ref(), config.get_ref(), AuthUser::viewer_id(&viewer))
        .recipe(recipe)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /api/recipes/{id} - mise à jour partielle par l'auteur (PROTÉGÉE)
#[patch("/{id}")]
pub async fn update_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateRecipeRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let recipe_id = path.into_inner();
    let request = body.into_inner();

    RecipeService::validate_update(&request)?;

    let image_path = match &request.image {
        Some(data_uri) => Some(image::save_base64_image(&config.media_root, data_uri).await?),
        None => None,
    };

    let result = RecipeService::update(
        db.get_ref(),
        recipe_id,
        auth_user.user_id,
        request,
        image_path.clone(),
    )
    .await;

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(e) => {
            if let Some(path) = &image_path {
                discard_image(&config, path).await;
            }
            return Err(e);
        }
    };

    let response = Presenter::new(db.get_ref(), config.get_ref(), Some(auth_user.user_id))
        .recipe(recipe)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /api/recipes/{id} (PROTÉGÉE, auteur seulement)
#[delete("/{id}")]
pub async fn delete_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    RecipeService::delete(db.get_ref(), path.into_inner(), auth_user.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/{id}/favorite")]
pub async fn add_favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    add_relation::<favorite::Entity>(auth_user, path.into_inner(), &db, &config).await
}

#[delete("/{id}/favorite")]
pub async fn remove_favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    RelationService::remove::<favorite::Entity, _>(db.get_ref(), auth_user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/{id}/shopping_cart")]
pub async fn add_to_shopping_cart(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    add_relation::<shopping_cart::Entity>(auth_user, path.into_inner(), &db, &config).await
}

#[delete("/{id}/shopping_cart")]
pub async fn remove_from_shopping_cart(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    RelationService::remove::<shopping_cart::Entity, _>(db.get_ref(), auth_user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

// 201 + représentation courte de la recette
async fn add_relation<R: UserRecipeRelation>(
    auth_user: AuthUser,
    recipe_id: i32,
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<HttpResponse, AppError> {
    let recipe = RelationService::add::<R, _>(db, auth_user.user_id, recipe_id).await?;
    let response = Presenter::new(db, config, Some(auth_user.user_id)).short_recipe(recipe);

    Ok(HttpResponse::Created().json(response))
}

async fn discard_image(config: &AppConfig, relative_path: &str) {
    if let Err(e) = tokio::fs::remove_file(config.media_root.join(relative_path)).await {
        log::warn!("Could not remove orphan image {}: {}", relative_path, e);
    }
}

pub fn recipes_routes(cfg: &mut web::ServiceConfig) {
    // les chemins fixes avant /{id}
    cfg.service(
        web::scope("/recipes")
            .service(list_recipes)
            .service(create_recipe)
            .service(download_shopping_cart)
            .service(get_recipe)
            .service(update_recipe)
            .service(delete_recipe)
            .service(add_favorite)
            .service(remove_favorite)
            .service(add_to_shopping_cart)
            .service(remove_from_shopping_cart)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::routes::configure_routes;
    use crate::test_support::{
        bearer, create_ingredient, create_recipe, create_tag, create_user, test_config, PIXEL,
    };
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_create_recipe_writes_image_and_returns_representation() {
        let db = test_connection().await;
        let media = tempfile::tempdir().unwrap();
        let user = create_user(&db, "chef").await;
        let lunch = create_tag(&db, "Lunch", "lunch").await;
        let flour = create_ingredient(&db, "Flour", "g").await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config(media.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header((header::AUTHORIZATION, bearer(&user)))
            .set_json(serde_json::json!({
                "tags": [lunch.id],
                "ingredients": [{"id": flour.id, "amount": 250}],
                "image": PIXEL,
                "name": "Flatbread",
                "text": "Knead and bake",
                "cooking_time": 20
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "Flatbread");
        assert_eq!(body["author"]["username"], "chef");
        assert_eq!(body["tags"][0]["slug"], "lunch");
        assert_eq!(body["ingredients"][0]["amount"], 250);
        assert_eq!(body["is_favorited"], false);

        let image = body["image"].as_str().unwrap();
        let relative = image.strip_prefix("/media/").unwrap();
        assert!(media.path().join(relative).exists());
    }

    #[actix_web::test]
    async fn test_create_recipe_rejects_bad_input() {
        let db = test_connection().await;
        let media = tempfile::tempdir().unwrap();
        let user = create_user(&db, "chef").await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config(media.path())))
                .configure(configure_routes),
        )
        .await;

        let anonymous = test::TestRequest::post()
            .uri("/api/recipes")
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, anonymous).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let zero_time = test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header((header::AUTHORIZATION, bearer(&user)))
            .set_json(serde_json::json!({
                "tags": [],
                "ingredients": [],
                "image": PIXEL,
                "name": "Instant",
                "text": "Nothing to do",
                "cooking_time": 0
            }))
            .to_request();
        let resp = test::call_service(&app, zero_time).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["fields"]["cooking_time"].is_array());
        // rien n'a été écrit
        assert!(!media.path().join("recipes").exists());
    }

    #[actix_web::test]
    async fn test_favorite_toggle_over_http() {
        let db = test_connection().await;
        let media = tempfile::tempdir().unwrap();
        let user = create_user(&db, "fan").await;
        let recipe = create_recipe(&db, user.id, "Crepes", &[], &[]).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config(media.path())))
                .configure(configure_routes),
        )
        .await;

        let uri = format!("/api/recipes/{}/favorite", recipe.id);
        let call = |method: test::TestRequest| {
            method
                .uri(&uri)
                .insert_header((header::AUTHORIZATION, bearer(&user)))
                .to_request()
        };

        let resp = test::call_service(&app, call(test::TestRequest::post())).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], recipe.id);
        assert_eq!(body["name"], "Crepes");
        assert_eq!(body["cooking_time"], 10);

        let resp = test::call_service(&app, call(test::TestRequest::post())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(&app, call(test::TestRequest::delete())).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = test::call_service(&app, call(test::TestRequest::delete())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let missing = test::TestRequest::post()
            .uri("/api/recipes/999/favorite")
            .insert_header((header::AUTHORIZATION, bearer(&user)))
            .to_request();
        let resp = test::call_service(&app, missing).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_download_shopping_cart() {
        let db = test_connection().await;
        let media = tempfile::tempdir().unwrap();
        let user = create_user(&db, "cook").await;
        let flour = create_ingredient(&db, "Flour", "g").await;
        let a = create_recipe(&db, user.id, "Bread", &[], &[(flour.id, 200)]).await;
        let b = create_recipe(&db, user.id, "Cake", &[], &[(flour.id, 300)]).await;
        RelationService::add::<shopping_cart::Entity, _>(&db, user.id, a.id).await.unwrap();
        RelationService::add::<shopping_cart::Entity, _>(&db, user.id, b.id).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config(media.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/recipes/download_shopping_cart")
            .insert_header((header::AUTHORIZATION, bearer(&user)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert_eq!(disposition.to_str().unwrap(), "attachment; filename=\"list.txt\"");
        assert!(resp
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let body = test::read_body(resp).await;
        assert_eq!(body.as_ref(), b"Flour: 500 g\n");
    }

    #[actix_web::test]
    async fn test_patch_by_other_user_is_forbidden() {
        let db = test_connection().await;
        let media = tempfile::tempdir().unwrap();
        let author = create_user(&db, "author").await;
        let other = create_user(&db, "other").await;
        let recipe = create_recipe(&db, author.id, "Stew", &[], &[]).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config(media.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri(&format!("/api/recipes/{}", recipe.id))
            .insert_header((header::AUTHORIZATION, bearer(&other)))
            .set_json(serde_json::json!({"name": "Mine now"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/recipes/{}", recipe.id))
            .insert_header((header::AUTHORIZATION, bearer(&author)))
            .set_json(serde_json::json!({"name": "Beef stew"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "Beef stew");
    }

    #[actix_web::test]
    async fn test_list_with_filters_and_anonymous_flags() {
        let db = test_connection().await;
        let media = tempfile::tempdir().unwrap();
        let user = create_user(&db, "cook").await;
        let breakfast = create_tag(&db, "Breakfast", "breakfast").await;
        let eggs = create_recipe(&db, user.id, "Eggs", &[breakfast.id], &[]).await;
        create_recipe(&db, user.id, "Soup", &[], &[]).await;
        RelationService::add::<favorite::Entity, _>(&db, user.id, eggs.id).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config(media.path())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/recipes?tags=breakfast").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["is_favorited"], false);

        let req = test::TestRequest::get()
            .uri("/api/recipes?is_favorited=1")
            .insert_header((header::AUTHORIZATION, bearer(&user)))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], eggs.id);
        assert_eq!(body[0]["is_favorited"], true);

        let req = test::TestRequest::get().uri("/api/recipes?is_favorited=1").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body.as_array().unwrap().is_empty());
    }
}
