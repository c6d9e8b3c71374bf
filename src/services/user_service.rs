use sea_orm::*;
use validator::Validate;

use crate::error::AppError;
use crate::models::dto::{CreateUserRequest, SetPasswordRequest};
use crate::models::users;
use crate::utils::password;

pub struct UserService;

impl UserService {
    /// Inscription : email et username doivent être libres
    pub async fn register(
        db: &DatabaseConnection,
        request: CreateUserRequest,
    ) -> Result<users::Model, AppError> {
        request.validate()?;

        let taken = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(&request.email))
                    .add(users::Column::Username.eq(&request.username)),
            )
            .one(db)
            .await?;

        if let Some(existing) = taken {
            let field = if existing.email == request.email { "email" } else { "username" };
            return Err(AppError::conflict(format!("A user with this {} already exists", field)));
        }

        let password_hash = password::hash_password(&request.password).map_err(AppError::Internal)?;

        let user = users::ActiveModel {
            email: Set(request.email),
            username: Set(request.username),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            password_hash: Set(password_hash),
            ..Default::default()
        }
        .insert(db)
        .await?;

        log::info!("User {} registered ({})", user.id, user.username);
        Ok(user)
    }

    /// Change le mot de passe si l'ancien est correct
    pub async fn set_password(
        db: &DatabaseConnection,
        user_id: i32,
        request: SetPasswordRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        let user = Self::get(db, user_id).await?;

        let is_valid = password::verify_password(&request.current_password, &user.password_hash)
            .map_err(AppError::Internal)?;
        if !is_valid {
            return Err(AppError::Validation("Current password is incorrect".to_string()));
        }

        let new_hash = password::hash_password(&request.new_password).map_err(AppError::Internal)?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(db).await?;

        log::info!("User {} changed password", user_id);
        Ok(())
    }

    /// Tous les utilisateurs, plus récents d'abord
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_desc(users::Column::Id)
            .all(db)
            .await
    }

    pub async fn get(db: &DatabaseConnection, user_id: i32) -> Result<users::Model, AppError> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", user_id)))
    }
}
