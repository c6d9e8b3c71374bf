use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateUserRequest, SetPasswordRequest, SubscriptionsQuery, UserResponse};
use crate::services::presenter::Presenter;
use crate::services::subscription_service::SubscriptionService;
use crate::services::user_service::UserService;

/// POST /api/users - inscription (PUBLIC)
#[post("")]
pub async fn register(
    body: web::Json<CreateUserRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = UserService::register(db.get_ref(), body.into_inner()).await?;

    // un nouveau compte n'a encore aucun abonné
    Ok(HttpResponse::Created().json(UserResponse::new(user, false)))
}

/// GET /api/users (PUBLIC)
#[get("")]
pub async fn list_users(
    viewer: Option<AuthUser>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let users = UserService::list(db.get_ref()).await?;
    let response = Presenter::new(db.get_ref(), config.get_ref(), AuthUser::viewer_id(&viewer))
        .users(users)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/users/me (PROTÉGÉE)
#[get("/me")]
pub async fn me(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = UserService::get(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::new(user, false)))
}

/// POST /api/users/set_password (PROTÉGÉE)
#[post("/set_password")]
pub async fn set_password(
    auth_user: AuthUser,
    body: web::Json<SetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    UserService::set_password(db.get_ref(), auth_user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/users/subscriptions?recipes_limit=3 (PROTÉGÉE)
#[get("/subscriptions")]
pub async fn subscriptions(
    auth_user: AuthUser,
    query: web::Query<SubscriptionsQuery>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let authors = SubscriptionService::list_authors(db.get_ref(), auth_user.user_id).await?;
    let presenter = Presenter::new(db.get_ref(), config.get_ref(), Some(auth_user.user_id));

    let mut response = Vec::with_capacity(authors.len());
    for author in authors {
        response.push(presenter.subscription(author, query.recipes_limit).await?);
    }

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/users/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_user(
    viewer: Option<AuthUser>,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let user = UserService::get(db.get_ref(), path.into_inner()).await?;
    let response = Presenter::new(db.get_ref(), config.get_ref(), AuthUser::viewer_id(&viewer))
        .user(user)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/users/{id}/subscribe (PROTÉGÉE)
#[post("/{id}/subscribe")]
pub async fn subscribe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    query: web::Query<SubscriptionsQuery>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let author = SubscriptionService::subscribe(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    let response = Presenter::new(db.get_ref(), config.get_ref(), Some(auth_user.user_id))
        .subscription(author, query.recipes_limit)
        .await?;

    Ok(HttpResponse::Created().json(response))
}

/// DELETE /api/users/{id}/subscribe (PROTÉGÉE)
#[delete("/{id}/subscribe")]
pub async fn unsubscribe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    SubscriptionService::unsubscribe(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(register)
            .service(list_users)
            .service(me)
            .service(set_password)
            .service(subscriptions)
            .service(get_user)
            .service(subscribe)
            .service(unsubscribe)
    );
}
