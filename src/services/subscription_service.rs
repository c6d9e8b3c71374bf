use sea_orm::*;
use sea_orm::sea_query::Query;

use crate::error::AppError;
use crate::models::{subscription, users};

pub struct SubscriptionService;

impl SubscriptionService {
    /// Le visiteur suit-il cet auteur ? false pour un anonyme
    pub async fn is_subscribed<C: ConnectionTrait>(
        db: &C,
        viewer: Option<i32>,
        author_id: i32,
    ) -> Result<bool, DbErr> {
        let Some(user_id) = viewer else {
            return Ok(false);
        };

        let row = subscription::Entity::find_by_id((user_id, author_id))
            .one(db)
            .await?;

        Ok(row.is_some())
    }

    /// Abonne `user_id` à `author_id` et retourne l'auteur suivi
    pub async fn subscribe(
        db: &DatabaseConnection,
        user_id: i32,
        author_id: i32,
    ) -> Result<users::Model, AppError> {
        let author = find_author(db, author_id).await?;

        if user_id == author_id {
            return Err(AppError::conflict("You cannot subscribe to yourself"));
        }

        if Self::is_subscribed(db, Some(user_id), author_id).await? {
            return Err(AppError::conflict(format!(
                "Already subscribed to user {}",
                author_id
            )));
        }

        subscription::Entity::insert(subscription::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
        })
        .exec_without_returning(db)
        .await?;

        log::info!("User {} subscribed to user {}", user_id, author_id);
        Ok(author)
    }

    pub async fn unsubscribe(
        db: &DatabaseConnection,
        user_id: i32,
        author_id: i32,
    ) -> Result<(), AppError> {
        find_author(db, author_id).await?;

        let result = subscription::Entity::delete_many()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::conflict(format!(
                "Not subscribed to user {}",
                author_id
            )));
        }

        log::info!("User {} unsubscribed from user {}", user_id, author_id);
        Ok(())
    }

    /// Auteurs suivis par `user_id`, par id croissant
    pub async fn list_authors(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<users::Model>, DbErr> {
        let followed = Query::select()
            .column(subscription::Column::AuthorId)
            .from(subscription::Entity)
            .and_where(subscription::Column::UserId.eq(user_id))
            .to_owned();

        users::Entity::find()
            .filter(users::Column::Id.in_subquery(followed))
            .order_by_asc(users::Column::Id)
            .all(db)
            .await
    }
}

async fn find_author(db: &DatabaseConnection, author_id: i32) -> Result<users::Model, AppError> {
    users::Entity::find_by_id(author_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", author_id)))
}
